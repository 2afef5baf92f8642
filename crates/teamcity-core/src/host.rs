// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Object model of the host test framework
//!
//! The reporter never runs tests. It only needs to ask a suite for its title,
//! its composed title and its parent, and a test for its title, parent suite
//! and measured duration. Hosts implement [`Suite`] and [`Test`] over their own
//! data; [`SuiteTree`] is an in-memory implementation used by the libtest
//! binding and by tests.

/// A suite as seen by the reporter
pub trait Suite: Sized {
    /// Leaf title of the suite
    fn title(&self) -> &str;

    /// Composed hierarchical title; empty for the framework's implicit root
    fn full_title(&self) -> String;

    /// Enclosing suite, if any
    fn parent(&self) -> Option<Self>;

    /// Whether this is the framework's own implicit top-level container
    fn is_root(&self) -> bool;
}

/// A test as seen by the reporter
pub trait Test {
    /// Suite type the test belongs to
    type Suite: Suite;

    /// Leaf title of the test
    fn title(&self) -> &str;

    /// Suite containing the test
    fn parent(&self) -> Self::Suite;

    /// Duration measured by the framework, once the test has completed
    fn duration_ms(&self) -> Option<u64>;
}

/// Error details attached to a failed test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    /// Short failure message
    pub message: Option<String>,
    /// Stack trace or full failure output
    pub stack: Option<String>,
}

impl Failure {
    /// Create a failure from a message and stack
    #[must_use]
    pub fn new(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            stack: Some(stack.into()),
        }
    }
}

/// The nearest ancestor whose composed title differs from the suite's own
///
/// Frameworks sometimes wrap a suite in internal nodes that compose to the
/// very same title. Those are skipped. An ancestor with an empty title (the
/// implicit root) is never an effective parent, so `None` means the suite is a
/// root as far as nesting is concerned.
pub fn effective_parent<S: Suite>(suite: &S) -> Option<S> {
    let title = suite.full_title();
    let mut current = suite.parent();
    while let Some(ancestor) = current {
        let ancestor_title = ancestor.full_title();
        if ancestor_title != title {
            return (!ancestor_title.is_empty()).then_some(ancestor);
        }
        current = ancestor.parent();
    }
    None
}

/// Handle to a suite in a [`SuiteTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuiteId(usize);

/// Handle to a test in a [`SuiteTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestId(usize);

#[derive(Debug, Clone)]
struct SuiteNode {
    title: String,
    parent: Option<SuiteId>,
}

#[derive(Debug, Clone)]
struct TestNode {
    title: String,
    parent: SuiteId,
    duration_ms: Option<u64>,
}

/// Arena-backed suite hierarchy with an implicit, untitled root
#[derive(Debug, Clone)]
pub struct SuiteTree {
    suites: Vec<SuiteNode>,
    tests: Vec<TestNode>,
    separator: String,
}

impl SuiteTree {
    /// Create a tree whose composed titles are joined with a space
    #[must_use]
    pub fn new() -> Self {
        Self::with_separator(" ")
    }

    /// Create a tree whose composed titles are joined with `separator`
    #[must_use]
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            suites: vec![SuiteNode {
                title: String::new(),
                parent: None,
            }],
            tests: Vec::new(),
            separator: separator.into(),
        }
    }

    /// The implicit root suite
    #[must_use]
    pub fn root(&self) -> SuiteId {
        SuiteId(0)
    }

    /// Add a suite under `parent`
    pub fn add_suite(&mut self, parent: SuiteId, title: impl Into<String>) -> SuiteId {
        self.suites.push(SuiteNode {
            title: title.into(),
            parent: Some(parent),
        });
        SuiteId(self.suites.len() - 1)
    }

    /// Add a test under `parent`
    pub fn add_test(&mut self, parent: SuiteId, title: impl Into<String>) -> TestId {
        self.tests.push(TestNode {
            title: title.into(),
            parent,
            duration_ms: None,
        });
        TestId(self.tests.len() - 1)
    }

    /// Record the duration of a completed test
    pub fn set_duration(&mut self, test: TestId, duration_ms: u64) {
        self.tests[test.0].duration_ms = Some(duration_ms);
    }

    /// Borrow a suite
    #[must_use]
    pub fn suite(&self, id: SuiteId) -> SuiteRef<'_> {
        SuiteRef { tree: self, id }
    }

    /// Borrow a test
    #[must_use]
    pub fn test(&self, id: TestId) -> TestRef<'_> {
        TestRef { tree: self, id }
    }

    /// Number of suites, including the implicit root
    #[must_use]
    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }
}

impl Default for SuiteTree {
    fn default() -> Self {
        Self::new()
    }
}

/// A suite borrowed from a [`SuiteTree`]
#[derive(Debug, Clone, Copy)]
pub struct SuiteRef<'a> {
    tree: &'a SuiteTree,
    id: SuiteId,
}

impl SuiteRef<'_> {
    /// Handle of this suite
    #[must_use]
    pub fn id(&self) -> SuiteId {
        self.id
    }

    fn node(&self) -> &SuiteNode {
        &self.tree.suites[self.id.0]
    }
}

impl Suite for SuiteRef<'_> {
    fn title(&self) -> &str {
        &self.node().title
    }

    fn full_title(&self) -> String {
        let mut titles = Vec::new();
        let mut current = Some(self.id);
        while let Some(id) = current {
            let node = &self.tree.suites[id.0];
            if !node.title.is_empty() {
                titles.push(node.title.as_str());
            }
            current = node.parent;
        }
        titles.reverse();
        titles.join(self.tree.separator.as_str())
    }

    fn parent(&self) -> Option<Self> {
        self.node().parent.map(|id| self.tree.suite(id))
    }

    fn is_root(&self) -> bool {
        self.id == self.tree.root()
    }
}

/// A test borrowed from a [`SuiteTree`]
#[derive(Debug, Clone, Copy)]
pub struct TestRef<'a> {
    tree: &'a SuiteTree,
    id: TestId,
}

impl<'a> Test for TestRef<'a> {
    type Suite = SuiteRef<'a>;

    fn title(&self) -> &str {
        &self.tree.tests[self.id.0].title
    }

    fn parent(&self) -> SuiteRef<'a> {
        self.tree.suite(self.tree.tests[self.id.0].parent)
    }

    fn duration_ms(&self) -> Option<u64> {
        self.tree.tests[self.id.0].duration_ms
    }
}
