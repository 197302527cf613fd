use std::collections::HashSet;
use std::rc::Rc;

use iced::widget::{Container, button, column, row, text};
use iced::{Color, Element, Length, Point, Rectangle, Size, Theme, Vector};
use iced_snippets::{
    Font, PointerEvent, PointerKind, Scene, SceneCanvas, Snippet, SnippetKey, TextAlign, TextBaseline,
    ViewContext,
};

pub fn main() {
    iced::application(PlateExample::new, PlateExample::update, PlateExample::view)
        .theme(Theme::GruvboxDark)
        .run()
        .unwrap()
}

#[derive(Debug, Clone)]
enum Message {
    Pointer(PointerEvent),
    Resize(usize, usize),
}

const WELL: f32 = 28.0;

/// One well, drawn in plate-local coordinates.
struct Well {
    row: usize,
    column: usize,
}

impl Well {
    fn label(&self) -> String {
        format!("{}{}", (b'A' + self.row as u8) as char, self.column + 1)
    }
}

impl Snippet for Well {
    type Args = bool;

    fn key(&self) -> SnippetKey {
        SnippetKey::of::<Well>((self.row, self.column))
    }

    fn paint(&self, ctx: &mut ViewContext<'_>, selected: &bool) {
        let origin = Point::new(self.column as f32 * WELL, self.row as f32 * WELL);
        let center = origin + Vector::new(0.5 * WELL, 0.5 * WELL);

        ctx.set_picking(true);
        ctx.fill_style(if *selected {
            Color::from_rgb(0.98, 0.29, 0.2)
        } else {
            Color::from_rgb(0.27, 0.52, 0.53)
        });
        ctx.fill_ellipse(center, Vector::new(0.4 * WELL, 0.4 * WELL));

        ctx.set_picking(false);
        ctx.fill_style(Color::from_rgb(0.92, 0.86, 0.7));
        ctx.font(if *selected { Font::bold(9.0) } else { Font::new(9.0) });
        ctx.text_align(TextAlign::Center);
        ctx.text_baseline(TextBaseline::Middle);
        ctx.fill_text(&self.label(), center);
    }
}

/// The plate outline with its wells nested inside.
struct Plate {
    wells: Vec<Rc<Well>>,
}

#[derive(Clone)]
struct PlateArgs {
    rows: usize,
    columns: usize,
    selected: Rc<HashSet<SnippetKey>>,
}

impl Snippet for Plate {
    type Args = PlateArgs;

    fn key(&self) -> SnippetKey {
        SnippetKey::of::<Plate>(0)
    }

    fn paint(&self, ctx: &mut ViewContext<'_>, args: &PlateArgs) {
        let size = Size::new(args.columns as f32 * WELL, args.rows as f32 * WELL);

        let outline = Rectangle::new(
            Point::new(-8.0, -8.0),
            Size::new(size.width + 16.0, size.height + 16.0),
        );

        ctx.fill_style(Color::from_rgb(0.16, 0.16, 0.16));
        ctx.fill_round_rect(outline, 10.0);
        ctx.stroke_style(Color::from_rgb(0.66, 0.6, 0.52));
        ctx.line_width(2.0);
        ctx.stroke_round_rect(outline, 10.0);

        for well in &self.wells {
            if well.row < args.rows && well.column < args.columns {
                ctx.snippet_with(well, args.selected.contains(&well.key()));
            }
        }
    }
}

struct PlateScene {
    plate: Rc<Plate>,
    args: PlateArgs,
}

impl Scene for PlateScene {
    fn paint(&self, ctx: &mut ViewContext<'_>) {
        let size = ctx.dimensions();
        let plate = Size::new(self.args.columns as f32 * WELL, self.args.rows as f32 * WELL);

        ctx.save();
        ctx.translate(Vector::new(
            0.5 * (size.width - plate.width),
            0.5 * (size.height - plate.height),
        ));
        ctx.snippet_with(&self.plate, self.args.clone());
        ctx.restore();
    }
}

struct PlateExample {
    scene: PlateScene,
    revision: u64,
    last_click: Option<String>,
}

impl PlateExample {
    pub fn new() -> Self {
        let wells = (0..16)
            .flat_map(|row| (0..24).map(move |column| Rc::new(Well { row, column })))
            .collect();

        Self {
            scene: PlateScene {
                plate: Rc::new(Plate { wells }),
                args: PlateArgs {
                    rows: 8,
                    columns: 12,
                    selected: Rc::new(HashSet::new()),
                },
            },
            revision: 0,
            last_click: None,
        }
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Pointer(event) => {
                if event.kind != PointerKind::Click {
                    return;
                }
                let Some(hit) = event.top_hit else {
                    return;
                };

                let mut selected = (*self.scene.args.selected).clone();
                if !selected.remove(&hit.key) {
                    selected.insert(hit.key);
                }
                self.scene.args.selected = Rc::new(selected);

                self.last_click = self
                    .scene
                    .plate
                    .wells
                    .iter()
                    .find(|w| w.key() == hit.key)
                    .map(|w| w.label());
                self.revision += 1;
            }
            Message::Resize(rows, columns) => {
                self.scene.args.rows = rows;
                self.scene.args.columns = columns;
                self.revision += 1;
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let info = column![
            text("Plate"),
            text(format!("Format: {} x {}", self.scene.args.rows, self.scene.args.columns)),
            text(format!("Selected: {}", self.scene.args.selected.len())),
            text(format!(
                "Last click: {}",
                self.last_click.as_deref().unwrap_or("none")
            )),
            button("24 wells").on_press(Message::Resize(4, 6)),
            button("96 wells").on_press(Message::Resize(8, 12)),
            button("384 wells").on_press(Message::Resize(16, 24)),
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
