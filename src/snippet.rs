//! The paint contract for draw units.

use std::rc::Rc;

use crate::context::ViewContext;
use crate::registry::SnippetKey;

/// A recorded invocation: the snippet together with the exact arguments it
/// was painted with, ready to be repeated while it fades out.
pub type Replay = Rc<dyn Fn(&mut ViewContext<'_>)>;

/// A logical draw unit with a stable identity.
///
/// Every frame the scene hands its snippets to the [`ViewContext`]; the
/// context remembers them by [`key`](Snippet::key) and animates whatever
/// numbers `paint` routes through it.
pub trait Snippet: 'static {
    /// Extra arguments supplied per invocation; `()` for none.
    type Args: Clone + 'static;

    fn key(&self) -> SnippetKey;

    fn paint(&self, ctx: &mut ViewContext<'_>, args: &Self::Args);
}

/// The root paint entry point of a view.
pub trait Scene {
    fn paint(&self, ctx: &mut ViewContext<'_>);
}

impl<F> Scene for F
where
    F: Fn(&mut ViewContext<'_>),
{
    fn paint(&self, ctx: &mut ViewContext<'_>) {
        self(ctx)
    }
}

pub(crate) fn replay<T: Snippet>(snippet: &Rc<T>, args: T::Args) -> Replay {
    let snippet = Rc::clone(snippet);
    Rc::new(move |ctx: &mut ViewContext<'_>| snippet.paint(ctx, &args))
}
