//! The iced widget: runs a [`View`] inside a canvas program.

use std::cell::{Cell, RefCell};
use std::time::Instant;

use iced::widget::canvas;
use iced::{Element, Event, Length, Rectangle, Renderer, Theme, mouse, window};

use crate::interp::Timing;
use crate::renderer::FrameSurface;
use crate::snippet::Scene;
use crate::tracker::Tracked;
use crate::view::{FrameOutcome, PointerEvent, PointerKind, View};

/// State for the canvas program (persists across frames via iced's widget tree).
#[derive(Default)]
pub struct SceneState {
    /// `draw` only gets a shared reference, but painting advances the view.
    view: RefCell<View>,
    /// Model revision the view last saw.
    revision: Option<u64>,
    /// Primary button went down inside the canvas.
    pressed: bool,
    /// The pointer moved while pressed.
    dragged: bool,
    /// When the last painted frame asked for the next one.
    next_frame: Cell<Option<Instant>>,
}

impl SceneState {
    pub fn view(&self) -> std::cell::Ref<'_, View> {
        self.view.borrow()
    }

    pub fn next_frame(&self) -> Option<Instant> {
        self.next_frame.get()
    }

    fn record_frame(&self, outcome: FrameOutcome) {
        self.next_frame.set(match outcome {
            FrameOutcome::Continue { next } => Some(next),
            FrameOutcome::Idle => None,
        });
    }
}

/// An animated canvas painting `scene`.
///
/// Bump [`revision`](SceneCanvas::revision) whenever the model behind the
/// scene changes; that is what wakes the frame loop up.
pub struct SceneCanvas<'a, S, Message> {
    scene: &'a S,
    timing: Timing,
    revision: u64,
    on_pointer: Option<Box<dyn Fn(PointerEvent) -> Message + 'a>>,
}

impl<'a, S: Scene, Message> SceneCanvas<'a, S, Message> {
    pub fn new(scene: &'a S) -> Self {
        Self {
            scene,
            timing: Timing::default(),
            revision: 0,
            on_pointer: None,
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Publish pointer events, annotated with the hits under the pointer.
    pub fn on_pointer(mut self, f: impl Fn(PointerEvent) -> Message + 'a) -> Self {
        self.on_pointer = Some(Box::new(f));
        self
    }

    pub fn draw(self) -> Element<'a, Message>
    where
        S: 'a,
        Message: 'a,
    {
        canvas(self).width(Length::Fill).height(Length::Fill).into()
    }

    /// The pointer is no longer over the canvas.
    fn leave(&self, view: &mut View, now: Instant) -> Option<canvas::Action<Message>> {
        view.pointer()?;
        view.clear_pointer();
        view.touch(now);
        self.pointer_action(view, PointerKind::Move)
    }

    fn pointer_action(&self, view: &View, kind: PointerKind) -> Option<canvas::Action<Message>> {
        match &self.on_pointer {
            Some(on_pointer) => Some(canvas::Action::publish((on_pointer)(view.pointer_event(kind)))),
            None => Some(canvas::Action::request_redraw()),
        }
    }
}

impl<S: Scene, Message> canvas::Program<Message> for SceneCanvas<'_, S, Message> {
    type State = SceneState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let now = Instant::now();
        let view = state.view.get_mut();

        match event {
            Event::Window(window::Event::RedrawRequested(_)) => {
                if view.timing() != self.timing {
                    match view.set_timing(self.timing) {
                        Ok(()) => view.update(now),
                        Err(error) => tracing::warn!(%error, "timing rejected"),
                    }
                }
                if state.revision != Some(self.revision) {
                    state.revision = Some(self.revision);
                    view.update(now);
                }
                if !view.is_running() {
                    return None;
                }
                Some(match state.next_frame.get() {
                    Some(next) => canvas::Action::request_redraw_at(next),
                    None => canvas::Action::request_redraw(),
                })
            }

            Event::Mouse(mouse::Event::CursorLeft) => self.leave(view, now),

            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let Some(position) = cursor.position_in(bounds) else {
                    return self.leave(view, now);
                };
                view.set_pointer(position);
                view.touch(now);

                let kind = if state.pressed {
                    state.dragged = true;
                    PointerKind::Drag
                } else {
                    PointerKind::Move
                };
                self.pointer_action(view, kind)
            }

            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                cursor.position_in(bounds)?;
                state.pressed = true;
                state.dragged = false;
                self.pointer_action(view, PointerKind::Down).map(canvas::Action::and_capture)
            }

            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if !state.pressed {
                    return None;
                }
                state.pressed = false;

                let kind = if !state.dragged && cursor.is_over(bounds) {
                    PointerKind::Click
                } else {
                    PointerKind::Up
                };
                self.pointer_action(view, kind)
            }

            _ => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        {
            let mut surface = Tracked::new(FrameSurface::new(&mut frame));
            let outcome = state
                .view
                .borrow_mut()
                .frame(Instant::now(), &mut surface, bounds.size(), self.scene);
            state.record_frame(outcome);
        }
        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.pressed || !cursor.is_over(bounds) {
            return mouse::Interaction::default();
        }
        state.view.borrow().cursor().interaction()
    }
}

#[cfg(test)]
mod tests {
    use iced::widget::canvas::Program;
    use iced::{Point, Size};

    use super::*;
    use crate::context::ViewContext;
    use crate::interp::TICK_INTERVAL;
    use crate::recorder::RecordingSurface;

    fn moved(position: Point) -> Event {
        Event::Mouse(mouse::Event::CursorMoved { position })
    }

    #[test]
    fn test_leaving_canvas_clears_pointer() {
        let scene = |_: &mut ViewContext<'_>| {};
        let program = SceneCanvas::new(&scene).on_pointer(|event: PointerEvent| event);
        let mut state = SceneState::default();
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(100.0, 100.0));

        let inside = Point::new(10.0, 10.0);
        let action = program.update(&mut state, &moved(inside), bounds, mouse::Cursor::Available(inside));
        assert!(action.is_some());
        assert_eq!(state.view().pointer(), Some(inside));

        let outside = Point::new(150.0, 10.0);
        let action = program.update(&mut state, &moved(outside), bounds, mouse::Cursor::Available(outside));
        assert!(action.is_some());
        assert_eq!(state.view().pointer(), None);

        // Already gone: nothing more to publish.
        let action = program.update(&mut state, &moved(outside), bounds, mouse::Cursor::Available(outside));
        assert!(action.is_none());
    }

    #[test]
    fn test_frame_outcome_schedules_next_redraw() {
        let scene = |_: &mut ViewContext<'_>| {};
        let program = SceneCanvas::<_, ()>::new(&scene);
        let mut state = SceneState::default();
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(100.0, 100.0));
        let now = Instant::now();

        let redraw = Event::Window(window::Event::RedrawRequested(now));
        assert!(program.update(&mut state, &redraw, bounds, mouse::Cursor::Unavailable).is_some());
        assert!(state.view().is_running());

        let mut surface = Tracked::new(RecordingSurface::new());
        let outcome = state.view.borrow_mut().frame(now, &mut surface, bounds.size(), &scene);
        state.record_frame(outcome);
        assert_eq!(state.next_frame(), Some(now + TICK_INTERVAL));
        assert!(program.update(&mut state, &redraw, bounds, mouse::Cursor::Unavailable).is_some());

        state.view.get_mut().stop();
        state.record_frame(FrameOutcome::Idle);
        assert_eq!(state.next_frame(), None);
        assert!(program.update(&mut state, &redraw, bounds, mouse::Cursor::Unavailable).is_none());
    }
}
