//! The frame driver: owns the registry, runs the paint/settle/replay cycle
//! and decides when the animation loop may stop.

use std::time::Instant;

use iced::{Point, Size, mouse};

use crate::affine::Affine;
use crate::context::{Hit, ViewContext};
use crate::error::Error;
use crate::interp::{MAX_STEP_MS, REMOVAL_THRESHOLD, TICK_INTERVAL, Timing, clamp_step};
use crate::registry::DrawManager;
use crate::snippet::Scene;
use crate::surface::Surface;
use crate::tracker::Tracked;

/// What the caller should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Paint another frame at `next`.
    Continue { next: Instant },
    /// Nothing is moving; wait for the next model update.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Something pickable is under the pointer.
    Pointer,
}

impl Cursor {
    pub fn interaction(self) -> mouse::Interaction {
        match self {
            Cursor::Default => mouse::Interaction::default(),
            Cursor::Pointer => mouse::Interaction::Pointer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Click,
    Down,
    Up,
    Drag,
    Move,
}

/// A pointer event annotated with what lies under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// `None` once the pointer left the view.
    pub position: Option<Point>,
    pub hits: Vec<Hit>,
    /// The hit painted last, i.e. visually on top.
    pub top_hit: Option<Hit>,
}

/// Per-frame counts, for tracing.
#[derive(Debug, Default, Clone, Copy)]
struct Settled {
    drawn: usize,
    fading: usize,
    removed: usize,
}

/// An animated view of a scene.
///
/// The caller paints the scene from scratch on every frame; the view keeps
/// the state that makes those paints move smoothly and fade in and out.
#[derive(Debug)]
pub struct View {
    timing: Timing,
    manager: DrawManager,
    pixel_ratio: f32,
    pointer: Option<Point>,
    hits: Vec<Hit>,
    errors: Vec<Error>,
    cursor: Cursor,
    running: bool,
    last_frame: Option<Instant>,
    last_update: Option<Instant>,
}

impl Default for View {
    fn default() -> Self {
        Self::with_timing(Timing::default())
    }
}

impl View {
    pub fn new(timing: Timing) -> Result<Self, Error> {
        timing.validate()?;
        Ok(Self::with_timing(timing))
    }

    fn with_timing(timing: Timing) -> Self {
        Self {
            timing,
            manager: DrawManager::new(),
            pixel_ratio: 1.0,
            pointer: None,
            hits: Vec::new(),
            errors: Vec::new(),
            cursor: Cursor::Default,
            running: false,
            last_frame: None,
            last_update: None,
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn set_timing(&mut self, timing: Timing) -> Result<(), Error> {
        timing.validate()?;
        self.timing = timing;
        Ok(())
    }

    pub fn manager(&self) -> &DrawManager {
        &self.manager
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The model changed: make sure frames keep coming.
    pub fn update(&mut self, now: Instant) {
        self.last_update = Some(now);
        self.start(now);
    }

    /// Pointer activity keeps a running loop alive but never starts one.
    pub fn touch(&mut self, now: Instant) {
        if self.running {
            self.last_update = Some(now);
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_update = Some(now);
        tracing::info!(snippets = self.manager.len(), "frame loop started");
    }

    /// Stop the loop. Snippet states are kept for the next start.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        tracing::info!(snippets = self.manager.len(), "frame loop stopped");
    }

    /// Pointer position in layout coordinates.
    pub fn set_pointer(&mut self, position: Point) {
        self.pointer = Some(position);
    }

    /// The pointer left the view: nothing is under it any more.
    pub fn clear_pointer(&mut self) {
        self.pointer = None;
        self.hits.clear();
        self.cursor = Cursor::Default;
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() && ratio > 0.0 {
            self.pixel_ratio = ratio;
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Hits of the last frame, in paint order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn top_hit(&self) -> Option<Hit> {
        self.hits.last().copied()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Snippet failures of the last frame.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn pointer_event(&self, kind: PointerKind) -> PointerEvent {
        PointerEvent {
            kind,
            position: self.pointer,
            hits: self.hits.clone(),
            top_hit: self.top_hit(),
        }
    }

    /// Paint one frame of `scene` onto `surface`.
    pub fn frame<S: Surface>(
        &mut self,
        now: Instant,
        surface: &mut Tracked<S>,
        dimensions: Size,
        scene: &dyn Scene,
    ) -> FrameOutcome {
        let dt = match self.last_frame {
            Some(previous) => clamp_step(now.saturating_duration_since(previous).as_secs_f32() * 1000.0),
            None => MAX_STEP_MS,
        };
        self.last_frame = Some(now);

        surface.set_transform(Affine::IDENTITY);
        surface.scale(self.pixel_ratio, self.pixel_ratio);
        let depth = surface.depth();

        for state in self.manager.iter_mut() {
            state.drawn = false;
            state.call_index = 0;
        }

        let ratio = self.pixel_ratio;
        let device_pointer = self.pointer.map(|p| Point::new(p.x * ratio, p.y * ratio));
        let timing = self.timing;

        let (hits, errors, settled) = {
            let mut ctx = ViewContext::new(surface, &mut self.manager, timing, dt, dimensions, device_pointer);
            scene.paint(&mut ctx);

            let settled = settle(ctx.manager, timing, dt);

            // A parent replayed first may re-enter its children, which then
            // count as drawn and are skipped here.
            let mut index = 0;
            while index < ctx.manager.len() {
                if let Some(state) = ctx.manager.get(index)
                    && !state.drawn
                {
                    let key = state.key;
                    let transform = state.transform;
                    let has_args = !state.calls.is_empty();
                    let calls = state.replays();
                    ctx.replay(key, transform, calls, has_args);
                }
                index += 1;
            }

            let (hits, errors) = ctx.finish();
            (hits, errors, settled)
        };
        surface.restore_to(depth);

        self.cursor = if hits.is_empty() { Cursor::Default } else { Cursor::Pointer };
        tracing::trace!(
            dt,
            drawn = settled.drawn,
            fading = settled.fading,
            removed = settled.removed,
            hits = hits.len(),
            "frame"
        );
        self.hits = hits;
        self.errors = errors;

        let idle = self
            .last_update
            .is_none_or(|update| now > update + timing.idle_after());
        if self.running && idle {
            self.stop();
        }

        if self.running {
            FrameOutcome::Continue {
                next: now + TICK_INTERVAL,
            }
        } else {
            FrameOutcome::Idle
        }
    }
}

/// Advance presence of every state; drop the ones that faded out.
fn settle(manager: &mut DrawManager, timing: Timing, dt: f32) -> Settled {
    let step = dt / timing.presence_ms;
    let mut settled = Settled::default();

    let mut index = 0;
    while let Some(state) = manager.get_mut(index) {
        state.fading = !state.drawn;

        if state.drawn {
            state.presence = if state.transitioning {
                (state.presence + step).min(1.0)
            } else {
                1.0
            };
            settled.drawn += 1;
            index += 1;
            continue;
        }

        state.presence = if state.transitioning {
            (state.presence - step).max(0.0)
        } else {
            0.0
        };

        if state.presence < REMOVAL_THRESHOLD {
            // The last state moves into this slot; look at it next.
            let key = state.key;
            manager.remove(key);
            settled.removed += 1;
        } else {
            settled.fading += 1;
            index += 1;
        }
    }

    settled
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::time::Duration;

    use iced::{Color, Rectangle, Vector};

    use super::*;
    use crate::interp::Intermediate;
    use crate::recorder::{Command, RecordingSurface};
    use crate::registry::SnippetKey;
    use crate::snippet::Snippet;

    const FRAME: Duration = Duration::from_millis(33);

    /// A 10×10 square whose x position is the invocation argument.
    struct Bar {
        id: u64,
    }

    impl Snippet for Bar {
        type Args = f32;

        fn key(&self) -> SnippetKey {
            SnippetKey(self.id)
        }

        fn paint(&self, ctx: &mut ViewContext<'_>, x: &f32) {
            ctx.set_picking(true);
            ctx.fill_style(Color::BLACK);
            ctx.fill_rect(Rectangle::new(Point::new(*x, 0.0), Size::new(10.0, 10.0)));
        }
    }

    fn bar(id: u64) -> Rc<Bar> {
        Rc::new(Bar { id })
    }

    struct Driver {
        view: View,
        now: Instant,
    }

    impl Driver {
        fn new() -> Self {
            Self {
                view: View::default(),
                now: Instant::now(),
            }
        }

        /// Advance one tick and paint.
        fn frame(&mut self, scene: impl Fn(&mut ViewContext<'_>)) -> (FrameOutcome, Vec<Command>) {
            self.now += FRAME;
            let mut surface = Tracked::new(RecordingSurface::new());
            let outcome = self.view.frame(self.now, &mut surface, Size::new(200.0, 200.0), &scene);
            (outcome, surface.into_inner().take())
        }
    }

    fn rects(commands: &[Command]) -> Vec<(Rectangle, f32)> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::FillRect { rect, pen } => Some((*rect, pen.fill.a)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_same_key_moves_instead_of_jumping() {
        let b = bar(1);
        let mut driver = Driver::new();
        driver.frame(|ctx| ctx.snippet_with(&b, 0.0));

        let (_, commands) = driver.frame(|ctx| ctx.snippet_with(&b, 100.0));
        let x = rects(&commands)[0].0.x;
        assert!(x > 0.0 && x < 100.0, "got {x}");
        assert_eq!(driver.view.manager().len(), 1);
    }

    #[test]
    fn test_converges_to_new_target() {
        let b = bar(1);
        let mut driver = Driver::new();
        driver.frame(|ctx| ctx.snippet_with(&b, 0.0));

        let mut last = 0.0;
        for _ in 0..60 {
            let (_, commands) = driver.frame(|ctx| ctx.snippet_with(&b, 100.0));
            let x = rects(&commands)[0].0.x;
            assert!(x >= last && x <= 100.0);
            last = x;
        }
        assert!((last - 100.0).abs() < 0.5, "got {last}");
    }

    #[test]
    fn test_fresh_snippet_waits_then_fades_in() {
        let b = bar(1);
        let mut driver = Driver::new();
        let mut alphas = Vec::new();
        for _ in 0..12 {
            let (_, commands) = driver.frame(|ctx| ctx.snippet_with(&b, 0.0));
            alphas.push(rects(&commands)[0].1);
        }
        assert_eq!(alphas[0], 0.0);
        assert!(alphas.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(*alphas.last().unwrap(), 1.0);
    }

    #[test]
    fn test_removed_snippet_fades_out_at_last_transform() {
        let b = bar(1);
        let mut driver = Driver::new();
        for _ in 0..10 {
            driver.frame(|ctx| {
                ctx.save();
                ctx.translate(Vector::new(50.0, 0.0));
                ctx.snippet_with(&b, 5.0);
                ctx.restore();
            });
        }
        assert_eq!(driver.view.manager().state(SnippetKey(1)).unwrap().presence(), 1.0);

        let mut alphas = Vec::new();
        for _ in 0..5 {
            let (_, commands) = driver.frame(|_| {});
            for command in &commands {
                if let Command::FillRect { rect, pen } = command {
                    assert_eq!(pen.transform, Affine::translation(50.0, 0.0));
                    assert_eq!(rect.x, 5.0);
                    alphas.push(pen.fill.a);
                }
            }
        }

        assert!(!alphas.is_empty());
        assert!(alphas.windows(2).all(|w| w[1] < w[0]));
        assert!(driver.view.manager().is_empty());
    }

    #[test]
    fn test_not_transitioning_snaps() {
        struct Snap;

        impl Snippet for Snap {
            type Args = f32;

            fn key(&self) -> SnippetKey {
                SnippetKey(9)
            }

            fn paint(&self, ctx: &mut ViewContext<'_>, x: &f32) {
                ctx.set_transitioning(false);
                ctx.fill_rect(Rectangle::new(Point::new(*x, 0.0), Size::new(1.0, 1.0)));
            }
        }

        let snap = Rc::new(Snap);
        let mut driver = Driver::new();
        driver.frame(|ctx| ctx.snippet_with(&snap, 0.0));
        let (_, commands) = driver.frame(|ctx| ctx.snippet_with(&snap, 80.0));
        assert_eq!(rects(&commands)[0].0.x, 80.0);
        assert_eq!(driver.view.manager().state(SnippetKey(9)).unwrap().presence(), 1.0);

        // Gone without transitioning: dropped on the next frame.
        driver.frame(|_| {});
        assert!(driver.view.manager().is_empty());
    }

    #[test]
    fn test_intermediates_bind_by_call_order() {
        struct Pair;

        impl Snippet for Pair {
            type Args = (f32, f32);

            fn key(&self) -> SnippetKey {
                SnippetKey(3)
            }

            fn paint(&self, ctx: &mut ViewContext<'_>, (a, b): &(f32, f32)) {
                let a = ctx.t(*a);
                let b = ctx.t(*b);
                ctx.set_transitioning(false);
                ctx.fill_rect(Rectangle::new(Point::new(a, b), Size::new(1.0, 1.0)));
            }
        }

        let pair = Rc::new(Pair);
        let mut driver = Driver::new();
        driver.frame(|ctx| ctx.snippet_with(&pair, (0.0, 100.0)));
        let (_, commands) = driver.frame(|ctx| ctx.snippet_with(&pair, (100.0, 0.0)));

        // Each call site moves away from its own previous value.
        let rect = rects(&commands)[0].0;
        assert!(rect.x > 0.0 && rect.x < 50.0);
        assert!(rect.y > 50.0 && rect.y < 100.0);
        assert_eq!(driver.view.manager().state(SnippetKey(3)).unwrap().intermediates().len(), 2);
    }

    #[test]
    fn test_interleaved_snippets_keep_their_own_call_order() {
        struct Inner;

        impl Snippet for Inner {
            type Args = (f32, f32);

            fn key(&self) -> SnippetKey {
                SnippetKey(4)
            }

            fn paint(&self, ctx: &mut ViewContext<'_>, (a, b): &(f32, f32)) {
                let a = ctx.t(*a);
                let b = ctx.t(*b);
                ctx.set_transitioning(false);
                ctx.fill_rect(Rectangle::new(Point::new(a, b), Size::new(1.0, 1.0)));
            }
        }

        struct Outer {
            inner: Rc<Inner>,
        }

        impl Snippet for Outer {
            type Args = [f32; 4];

            fn key(&self) -> SnippetKey {
                SnippetKey(5)
            }

            fn paint(&self, ctx: &mut ViewContext<'_>, [a, b, c, d]: &[f32; 4]) {
                // The inner snippet's calls land between the two outer calls.
                let a = ctx.t(*a);
                ctx.snippet_with(&self.inner, (*b, *c));
                let d = ctx.t(*d);
                ctx.set_transitioning(false);
                ctx.fill_rect(Rectangle::new(Point::new(a, d), Size::new(1.0, 1.0)));
            }
        }

        let outer = Rc::new(Outer { inner: Rc::new(Inner) });
        let mut driver = Driver::new();
        driver.frame(|ctx| ctx.snippet_with(&outer, [0.0, 100.0, 100.0, 0.0]));
        let (_, commands) = driver.frame(|ctx| ctx.snippet_with(&outer, [100.0, 0.0, 0.0, 100.0]));

        let drawn = rects(&commands);
        let (inner, outer) = (drawn[0].0, drawn[1].0);
        assert!(outer.x > 0.0 && outer.x < 50.0, "got {}", outer.x);
        assert!(outer.y > 0.0 && outer.y < 50.0, "got {}", outer.y);
        assert!(inner.x > 50.0 && inner.x < 100.0, "got {}", inner.x);
        assert!(inner.y > 50.0 && inner.y < 100.0, "got {}", inner.y);

        let manager = driver.view.manager();
        assert_eq!(manager.state(SnippetKey(4)).unwrap().intermediates().len(), 2);
        assert_eq!(manager.state(SnippetKey(5)).unwrap().intermediates().len(), 2);
    }

    #[test]
    fn test_pointer_leaving_clears_hits() {
        let b = bar(1);
        let mut driver = Driver::new();
        driver.view.set_pointer(Point::new(5.0, 5.0));
        driver.frame(|ctx| ctx.snippet_with(&b, 0.0));
        assert_eq!(driver.view.hits().len(), 1);

        driver.view.clear_pointer();
        assert_eq!(driver.view.pointer(), None);
        assert!(driver.view.hits().is_empty());
        assert_eq!(driver.view.cursor(), Cursor::Default);

        let event = driver.view.pointer_event(PointerKind::Move);
        assert_eq!(event.position, None);
        assert_eq!(event.top_hit, None);

        driver.frame(|ctx| ctx.snippet_with(&b, 0.0));
        assert!(driver.view.hits().is_empty());
    }

    #[test]
    fn test_hits_follow_paint_order() {
        let (a, b, c) = (bar(1), bar(2), bar(3));
        let mut driver = Driver::new();
        driver.view.set_pointer(Point::new(5.0, 5.0));
        driver.frame(|ctx| {
            ctx.snippet_with(&a, 0.0);
            ctx.snippet_with(&b, 0.0);
            ctx.snippet_with(&c, 0.0);
        });

        let keys: Vec<_> = driver.view.hits().iter().map(|h| h.key).collect();
        assert_eq!(keys, vec![SnippetKey(1), SnippetKey(2), SnippetKey(3)]);
        assert_eq!(driver.view.top_hit().map(|h| h.key), Some(SnippetKey(3)));
        assert_eq!(driver.view.cursor(), Cursor::Pointer);

        let event = driver.view.pointer_event(PointerKind::Click);
        assert_eq!(event.kind, PointerKind::Click);
        assert_eq!(event.position, Some(Point::new(5.0, 5.0)));
        assert_eq!(event.hits.len(), 3);

        driver.view.set_pointer(Point::new(150.0, 150.0));
        driver.frame(|ctx| ctx.snippet_with(&a, 0.0));
        assert!(driver.view.hits().is_empty());
        assert_eq!(driver.view.cursor(), Cursor::Default);
    }

    #[test]
    fn test_pixel_ratio_scales_pointer() {
        let b = bar(1);
        let mut driver = Driver::new();
        driver.view.set_pixel_ratio(2.0);
        driver.view.set_pointer(Point::new(5.0, 4.0));
        let (_, commands) = driver.frame(|ctx| ctx.snippet_with(&b, 0.0));

        let hit = driver.view.top_hit().unwrap();
        assert_eq!(hit.local, Point::new(5.0, 4.0));
        assert_eq!(rects(&commands).len(), 1);
        let pen = commands.iter().find_map(|c| c.pen()).unwrap();
        assert_eq!(pen.transform, Affine::scaling(2.0, 2.0));
    }

    #[test]
    fn test_degenerate_transform_skips_hits() {
        let b = bar(1);
        let mut driver = Driver::new();
        driver.view.set_pointer(Point::new(0.0, 0.0));
        driver.frame(|ctx| {
            ctx.scale(0.0, 0.0);
            ctx.snippet_with(&b, 0.0);
        });
        assert!(driver.view.hits().is_empty());
        assert!(driver.view.errors().is_empty());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let b = bar(1);
        let mut driver = Driver::new();
        driver.view.update(driver.now);
        driver.frame(|ctx| ctx.snippet_with(&b, 0.0));
        assert!(driver.view.is_running());

        fn contents(view: &View) -> Vec<(SnippetKey, f32, Vec<Intermediate>, usize)> {
            view.manager()
                .iter()
                .map(|s| (s.key(), s.presence(), s.intermediates().to_vec(), s.recorded_calls()))
                .collect()
        }

        driver.view.stop();
        assert!(!driver.view.is_running());
        let once = contents(&driver.view);

        driver.view.stop();
        assert!(!driver.view.is_running());
        assert_eq!(contents(&driver.view), once);
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].0, SnippetKey(1));
        assert_eq!(once[0].3, 1);
    }

    #[test]
    fn test_loop_idles_without_updates() {
        let mut driver = Driver::new();
        driver.view.update(driver.now);
        let (outcome, _) = driver.frame(|_| {});
        assert!(matches!(outcome, FrameOutcome::Continue { .. }));

        // Pointer activity keeps it alive.
        driver.now += Duration::from_millis(1500);
        driver.view.touch(driver.now);
        driver.now += Duration::from_millis(1500);
        let (outcome, _) = driver.frame(|_| {});
        assert!(matches!(outcome, FrameOutcome::Continue { .. }));

        driver.now += Duration::from_secs(3);
        let (outcome, _) = driver.frame(|_| {});
        assert_eq!(outcome, FrameOutcome::Idle);
        assert!(!driver.view.is_running());

        driver.view.touch(driver.now);
        assert!(!driver.view.is_running());
        driver.view.update(driver.now);
        assert!(driver.view.is_running());
    }

    #[test]
    fn test_panicking_snippet_is_isolated() {
        struct Broken;

        impl Snippet for Broken {
            type Args = ();

            fn key(&self) -> SnippetKey {
                SnippetKey(66)
            }

            fn paint(&self, ctx: &mut ViewContext<'_>, _: &()) {
                ctx.save();
                ctx.translate(Vector::new(1000.0, 0.0));
                panic!("no data");
            }
        }

        let (a, broken, c) = (bar(1), Rc::new(Broken), bar(3));
        let mut driver = Driver::new();
        let (_, commands) = driver.frame(|ctx| {
            ctx.snippet_with(&a, 0.0);
            ctx.snippet(&broken);
            ctx.snippet_with(&c, 20.0);
        });

        assert_eq!(
            driver.view.errors(),
            &[Error::SnippetPanicked {
                key: SnippetKey(66),
                message: "no data".to_owned(),
            }]
        );
        let drawn = rects(&commands);
        assert_eq!(drawn.len(), 2);
        // The broken snippet's translation did not leak into the next one.
        let last = commands.iter().rev().find_map(|c| c.pen()).unwrap();
        assert_eq!(last.transform, Affine::IDENTITY);
        assert_eq!(drawn[1].0.x, 20.0);
    }

    struct Parent {
        child: Rc<Bar>,
    }

    impl Snippet for Parent {
        type Args = ();

        fn key(&self) -> SnippetKey {
            SnippetKey(100)
        }

        fn paint(&self, ctx: &mut ViewContext<'_>, _: &()) {
            ctx.fill_rect(Rectangle::new(Point::ORIGIN, Size::new(40.0, 40.0)));
            ctx.translate(Vector::new(10.0, 10.0));
            ctx.snippet_with(&self.child, 5.0);
        }
    }

    #[test]
    fn test_nested_snippets_replay_once_through_parent() {
        let parent = Rc::new(Parent { child: bar(7) });
        let mut driver = Driver::new();
        for _ in 0..10 {
            let (_, commands) = driver.frame(|ctx| ctx.snippet(&parent));
            assert_eq!(rects(&commands).len(), 2);
        }

        let (_, commands) = driver.frame(|_| {});
        assert_eq!(rects(&commands).len(), 2);

        let manager = driver.view.manager();
        let parent_presence = manager.state(SnippetKey(100)).unwrap().presence();
        let child = manager.state(SnippetKey(7)).unwrap();
        assert!(parent_presence < 1.0);
        assert_eq!(child.presence(), parent_presence);
        assert_eq!(child.transform(), Affine::translation(10.0, 10.0));
    }

    #[test]
    fn test_reappearing_snippet_starts_from_new_values() {
        let b = bar(1);
        let mut driver = Driver::new();
        for _ in 0..10 {
            driver.frame(|ctx| ctx.snippet_with(&b, 0.0));
        }
        driver.frame(|_| {});
        assert!(driver.view.manager().contains(SnippetKey(1)));

        let (_, commands) = driver.frame(|ctx| ctx.snippet_with(&b, 100.0));
        assert_eq!(rects(&commands)[0].0.x, 100.0);
    }

    #[test]
    fn test_invalid_timing_is_rejected() {
        let timing = Timing::builder().movement_ms(-5.0).build();
        assert!(matches!(View::new(timing), Err(Error::InvalidTiming { name: "movement", .. })));
    }
}
