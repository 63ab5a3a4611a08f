//! fOS VDOM - Virtual DOM Reconciler
//!
//! Renders immutable element trees into a host document. Each render builds a
//! fiber tree, diffs it index by index against the previous one, and commits
//! the resulting placements, updates and deletions through a [`DomDriver`].
//! Function components keep state in ordered hook slots; class components
//! keep an instance across renders.

mod component;
mod config;
mod element;
mod error;
mod fiber;
mod hooks;
mod props;

pub mod commit;
pub mod driver;
pub mod patch;
pub mod reconciler;
pub mod root;

pub use component::{ClassComponent, Component, Updater};
pub use config::{Config, PatchMode};
pub use element::{
    create_element, create_text_element, Element, ElementType, NODE_VALUE, TEXT_ELEMENT,
};
pub use error::{RenderError, RenderResult};
pub use fiber::{Effect, EffectTag, Fiber, FiberId, FiberTree};
pub use hooks::{Hooks, PendingUpdates, StateSetter};
pub use props::{PropValue, Props, CHILDREN};

pub use commit::commit;
pub use driver::DomDriver;
pub use reconciler::{reconcile, WorkTree};
pub use root::Root;

pub use fos_dom::{DomEvent, Listener};

/// Render `element` into `container` and commit it in one step.
///
/// Pass the tree returned by the previous render of the same container as
/// `previous` to diff against it; `None` renders from scratch. If the diff
/// fails, `previous` is left in place and the document is untouched. Once
/// the commit starts the previous tree is consumed.
pub fn render<D: DomDriver>(
    element: &Element,
    container: D::Node,
    driver: &mut D,
    previous: &mut Option<FiberTree<D::Node>>,
    config: &Config,
) -> RenderResult<FiberTree<D::Node>> {
    let work = reconcile(element, container, previous, config)?;
    commit(work, driver, config)
}
