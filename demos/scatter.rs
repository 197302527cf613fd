use std::rc::Rc;

use iced::time::{self, Duration};
use iced::widget::{Container, column, row, text};
use iced::{Color, Element, Length, Point, Subscription, Theme, Vector};
use iced_snippets::{PointerEvent, Scene, SceneCanvas, Snippet, SnippetKey, ViewContext};

pub fn main() {
    iced::application(Scatter::new, Scatter::update, Scatter::view)
        .subscription(Scatter::subscription)
        .theme(Theme::GruvboxDark)
        .run()
        .unwrap()
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    Pointer(PointerEvent),
}

/// A scatter point. Its position is an argument so it can move.
struct Dot {
    id: usize,
}

#[derive(Clone)]
struct DotArgs {
    center: Point,
    radius: f32,
    color: Color,
}

impl Snippet for Dot {
    type Args = DotArgs;

    fn key(&self) -> SnippetKey {
        SnippetKey::of::<Dot>(self.id)
    }

    fn paint(&self, ctx: &mut ViewContext<'_>, args: &DotArgs) {
        ctx.set_picking(true);
        ctx.fill_style(args.color);
        ctx.fill_ellipse(args.center, Vector::new(args.radius, args.radius));
    }
}

struct ScatterScene {
    dots: Vec<Rc<Dot>>,
    phase: usize,
    hovered: Option<SnippetKey>,
}

impl ScatterScene {
    fn position(&self, id: usize) -> (f32, f32) {
        let t = self.phase as f32 * 0.9 + id as f32 * 2.399;
        (0.5 + 0.4 * (t * 1.3).sin(), 0.5 + 0.4 * (t * 0.7).cos())
    }

    /// Every few phases a different fifth of the dots is hidden.
    fn visible(&self, id: usize) -> bool {
        (id + self.phase) % 5 != 0
    }
}

impl Scene for ScatterScene {
    fn paint(&self, ctx: &mut ViewContext<'_>) {
        let size = ctx.dimensions();

        for dot in &self.dots {
            if !self.visible(dot.id) {
                continue;
            }
            let (x, y) = self.position(dot.id);
            let hovered = self.hovered == Some(dot.key());
            ctx.snippet_with(
                dot,
                DotArgs {
                    center: Point::new(x * size.width, y * size.height),
                    radius: if hovered { 12.0 } else { 6.0 },
                    color: if hovered {
                        Color::from_rgb(0.98, 0.74, 0.18)
                    } else {
                        Color::from_rgb(0.51, 0.65, 0.6)
                    },
                },
            );
        }
    }
}

struct Scatter {
    scene: ScatterScene,
    revision: u64,
}

impl Scatter {
    pub fn new() -> Self {
        Self {
            scene: ScatterScene {
                dots: (0..60).map(|id| Rc::new(Dot { id })).collect(),
                phase: 0,
                hovered: None,
            },
            revision: 0,
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        time::every(Duration::from_millis(1500)).map(|_| Message::Tick)
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Tick => {
                self.scene.phase += 1;
                self.revision += 1;
            }
            Message::Pointer(event) => {
                let hovered = event.top_hit.map(|hit| hit.key);
                if hovered != self.scene.hovered {
                    self.scene.hovered = hovered;
                    self.revision += 1;
                }
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let visible = self.scene.dots.iter().filter(|d| self.scene.visible(d.id)).count();

        let info = column![
            text("Scatter"),
            text(format!("Visible: {}", visible)),
            text(format!("Phase: {}", self.scene.phase)),
            text(match self.scene.hovered {
                Some(key) => format!("Hovered: {}", key),
                None => "Hovered: none".to_string(),
            }),
        ]
        .spacing(5);

        let canvas = SceneCanvas::new(&self.scene)
            .revision(self.revision)
            .on_pointer(Message::Pointer)
            .draw();

        row![
            Container::new(canvas)
                .width(Length::FillPortion(3))
                .height(Length::Fill),
            Container::new(info)
                .width(Length::FillPortion(1))
                .height(Length::Fill)
                .padding(20),
        ]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }
}
