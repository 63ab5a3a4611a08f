//! Render Root
//!
//! Keeps the committed tree and last element of one container, so callers
//! can re-render after state updates without threading trees by hand.

use std::fmt;

use crate::commit::remove_host_nodes;
use crate::driver::DomDriver;
use crate::fiber::FiberId;
use crate::{Config, Element, FiberTree, RenderResult};

/// A container rendered into by the reconciler
pub struct Root<N> {
    container: N,
    config: Config,
    element: Option<Element>,
    current: Option<FiberTree<N>>,
}

impl<N: Clone + PartialEq + fmt::Debug> Root<N> {
    pub fn new(container: N) -> Self {
        Self::with_config(container, Config::default())
    }

    pub fn with_config(container: N, config: Config) -> Self {
        Self {
            container,
            config,
            element: None,
            current: None,
        }
    }

    pub fn container(&self) -> &N {
        &self.container
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Last committed tree
    pub fn current(&self) -> Option<&FiberTree<N>> {
        self.current.as_ref()
    }

    /// Render `element`, diffing against the last committed tree.
    ///
    /// If the diff fails, the committed tree and last element are kept and the
    /// document is untouched. If the commit fails, the committed tree is
    /// discarded and the container holds whatever the failed commit left.
    pub fn render<D>(&mut self, driver: &mut D, element: Element) -> RenderResult<&FiberTree<N>>
    where
        D: DomDriver<Node = N>,
    {
        let container = self.container.clone();
        let tree = crate::render(&element, container, driver, &mut self.current, &self.config)?;
        self.element = Some(element);
        Ok(&*self.current.insert(tree))
    }

    /// Render the last element again. Returns `None` before the first render.
    pub fn rerender<D>(&mut self, driver: &mut D) -> RenderResult<Option<&FiberTree<N>>>
    where
        D: DomDriver<Node = N>,
    {
        let Some(element) = self.element.clone() else {
            return Ok(None);
        };
        self.render(driver, element).map(Some)
    }

    /// Whether a state setter ran since the last render
    pub fn has_pending_updates(&self) -> bool {
        self.current.as_ref().is_some_and(FiberTree::has_pending_updates)
    }

    /// Re-render only if updates are pending. Returns whether it rendered.
    pub fn flush<D>(&mut self, driver: &mut D) -> RenderResult<bool>
    where
        D: DomDriver<Node = N>,
    {
        if !self.has_pending_updates() {
            return Ok(false);
        }
        tracing::debug!(container = ?self.container, "flushing pending updates");
        self.rerender(driver)?;
        Ok(true)
    }

    /// Remove everything rendered into the container and drop all state
    pub fn unmount<D>(&mut self, driver: &mut D) -> RenderResult<()>
    where
        D: DomDriver<Node = N>,
    {
        self.element = None;
        let Some(tree) = self.current.take() else {
            return Ok(());
        };
        for child in tree.children(FiberId::ROOT) {
            remove_host_nodes(&tree, child, &self.container, driver)?;
        }
        tracing::debug!(container = ?self.container, "unmounted");
        Ok(())
    }
}

impl<N: fmt::Debug> fmt::Debug for Root<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("container", &self.container)
            .field("config", &self.config)
            .field("mounted", &self.current.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_element, Props};
    use fos_dom::DomTree;

    #[test]
    fn test_rerender_before_render() {
        let mut dom = DomTree::new();
        let mut root = Root::new(dom.root());
        assert!(root.rerender(&mut dom).unwrap().is_none());
        assert!(!root.flush(&mut dom).unwrap());
    }

    #[test]
    fn test_unmount_clears_container() {
        let mut dom = DomTree::new();
        let mut root = Root::new(dom.root());
        root.render(&mut dom, create_element("p", Props::new(), ["bye"])).unwrap();
        assert_eq!(dom.inner_html(dom.root()), "<p>bye</p>");

        root.unmount(&mut dom).unwrap();
        assert_eq!(dom.inner_html(dom.root()), "");
        assert!(root.current().is_none());
    }
}
