//! The document graph.
//!
//! [`DocumentGraph::build`] takes every parsed document and:
//!
//! 1. assigns permalinks and rejects duplicate identifiers;
//! 2. resolves each declared parent, appending the child to the parent's
//!    `children` (in document order) and rejecting dangling ids and cycles;
//! 3. partitions the set into pages (by id), posts (newest first) and series
//!    (posts with children, in post order).
//!
//! The graph then synthesizes the archive page and one collection per series,
//! and renders everything. Rendering reads a [`DocumentIndex`], an immutable
//! id lookup over the complete set, so links and image searches see every
//! document regardless of render order.

use crate::assets::{AssetError, AssetRegistry};
use crate::document::{Document, DocumentId, DocumentKind, Features};
use crate::frontmatter::{self, DocumentError};
use crate::markup::{self, RenderContext, RenderError};
use std::collections::HashMap;
use thiserror::Error;

/// Identifier of the generated archive page.
pub const ARCHIVE_ID: &str = "archive";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("duplicate document id {id:?}: {first} and {second}")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },
    #[error("{document}: parent id {parent:?} does not correspond to an existing document")]
    UnresolvedParent { document: String, parent: String },
    #[error("{document}: parent chain loops back to itself")]
    ParentCycle { document: String },
    #[error("generated document: {0}")]
    Generated(#[from] DocumentError),
}

/// A document whose render pass recorded an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFailure {
    pub id: DocumentId,
    pub error: RenderError,
}

/// Read-only id lookup over a complete document set.
pub struct DocumentIndex<'g> {
    by_id: HashMap<&'g DocumentId, &'g Document>,
}

impl<'g> DocumentIndex<'g> {
    pub fn new(documents: &'g [Document]) -> Self {
        Self {
            by_id: documents.iter().map(|doc| (&doc.id, doc)).collect(),
        }
    }

    pub fn get(&self, id: &DocumentId) -> Option<&'g Document> {
        self.by_id.get(id).copied()
    }

    /// Parent chain of `doc`, nearest first.
    pub fn ancestors(&self, doc: &Document) -> Vec<&'g Document> {
        let mut chain: Vec<&'g Document> = Vec::new();
        let mut next = doc.parent.as_ref();
        while let Some(parent) = next.and_then(|id| self.get(id)) {
            if chain.len() >= self.by_id.len() {
                break;
            }
            chain.push(parent);
            next = parent.parent.as_ref();
        }
        chain
    }
}

#[derive(Debug, Clone)]
pub struct DocumentGraph {
    documents: Vec<Document>,
    positions: HashMap<DocumentId, usize>,
    pages: Vec<DocumentId>,
    posts: Vec<DocumentId>,
    series: Vec<DocumentId>,
    collections: Vec<DocumentId>,
}

impl DocumentGraph {
    pub fn build(mut documents: Vec<Document>) -> Result<Self, GraphError> {
        let mut positions = HashMap::with_capacity(documents.len());
        for i in 0..documents.len() {
            let doc = &mut documents[i];
            doc.permalink = Document::permalink_for(&doc.id);
            doc.parent = None;
            doc.children.clear();
            if let Some(first) = positions.insert(doc.id.clone(), i) {
                return Err(GraphError::DuplicateId {
                    id: documents[i].id.to_string(),
                    first: documents[first].display_name(),
                    second: documents[i].display_name(),
                });
            }
        }

        link_parents(&mut documents, &positions)?;
        reject_cycles(&documents, &positions)?;

        let mut graph = Self {
            documents,
            positions,
            pages: Vec::new(),
            posts: Vec::new(),
            series: Vec::new(),
            collections: Vec::new(),
        };
        graph.partition();
        Ok(graph)
    }

    fn partition(&mut self) {
        let mut pages: Vec<&Document> = Vec::new();
        let mut posts: Vec<&Document> = Vec::new();
        for doc in &self.documents {
            match doc.kind {
                DocumentKind::Page => pages.push(doc),
                DocumentKind::Post => posts.push(doc),
                DocumentKind::Collection => {}
            }
        }
        pages.sort_by(|a, b| a.id.cmp(&b.id));
        posts.sort_by(|a, b| b.published.cmp(&a.published));

        self.series = posts
            .iter()
            .filter(|doc| !doc.children.is_empty())
            .map(|doc| doc.id.clone())
            .collect();
        self.pages = pages.into_iter().map(|doc| doc.id.clone()).collect();
        self.posts = posts.into_iter().map(|doc| doc.id.clone()).collect();
    }

    fn insert(&mut self, mut doc: Document) {
        doc.permalink = Document::permalink_for(&doc.id);
        self.positions.insert(doc.id.clone(), self.documents.len());
        self.documents.push(doc);
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.positions.get(id).map(|&i| &self.documents[i])
    }

    /// Every document, parsed ones in input order followed by synthesized ones.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn index(&self) -> DocumentIndex<'_> {
        DocumentIndex::new(&self.documents)
    }

    fn resolve<'s>(&'s self, ids: &'s [DocumentId]) -> impl Iterator<Item = &'s Document> + 's {
        ids.iter().filter_map(|id| self.get(id))
    }

    /// Pages ordered by id.
    pub fn pages(&self) -> impl Iterator<Item = &Document> + '_ {
        self.resolve(&self.pages)
    }

    /// Posts, newest first. Posts with equal dates keep input order.
    pub fn posts(&self) -> impl Iterator<Item = &Document> + '_ {
        self.resolve(&self.posts)
    }

    /// Roots of series, in post order.
    pub fn series(&self) -> impl Iterator<Item = &Document> + '_ {
        self.resolve(&self.series)
    }

    pub fn collections(&self) -> impl Iterator<Item = &Document> + '_ {
        self.resolve(&self.collections)
    }

    pub fn most_recent(&self) -> Option<&Document> {
        self.posts().next()
    }

    /// Children of `doc`, in document order.
    pub fn children<'s>(&'s self, doc: &'s Document) -> impl Iterator<Item = &'s Document> + 's {
        self.resolve(&doc.children)
    }

    /// Synthesize the `archive` page: every post, newest first, grouped under
    /// a heading per month.
    ///
    /// Returns `false` without changes when the id is already taken.
    pub fn generate_archive(&mut self) -> Result<bool, GraphError> {
        let id = DocumentId::new(ARCHIVE_ID);
        if self.contains(&id) {
            log::warn!("a document already uses the id {ARCHIVE_ID:?}, not generating an archive");
            return Ok(false);
        }

        let mut source = String::from("-type=page\n-title=Archives\n");
        let mut current_month = None;
        for post in self.posts() {
            let Some(published) = post.published else {
                continue;
            };
            let month = published.format("%B %Y").to_string();
            if current_month.as_ref() != Some(&month) {
                source.push_str(&format!("\n### {month}\n\n"));
                current_month = Some(month);
            }
            source.push_str(&format!("* [%](*{})\n", post.id));
        }

        let archive = frontmatter::parse(ARCHIVE_ID, source.as_bytes())?;
        self.insert(archive);
        self.pages.push(id);
        self.pages.sort();
        Ok(true)
    }

    /// Synthesize one collection per series root, id `<root>-series`.
    pub fn generate_collections(&mut self) {
        let roots: Vec<DocumentId> = self.series.clone();
        for root_id in roots {
            let Some(root) = self.get(&root_id) else {
                continue;
            };
            let id = DocumentId::new(&format!("{root_id}-series"));
            if self.contains(&id) {
                log::warn!("a document already uses the id {:?}, skipping collection", id.as_str());
                continue;
            }

            let mut collection = Document::new(id.clone(), DocumentKind::Collection);
            collection.title = root.title.clone();
            collection.published = root.published;
            collection.updated = root.updated;
            collection.children = root.children.clone();
            collection.features = self
                .resolve(&root.children)
                .fold(Features::default(), |acc, child| acc.union(child.features));

            self.insert(collection);
            self.collections.push(id);
        }
    }

    /// Recompute each collection's flags from its members.
    pub fn refresh_collection_features(&mut self) {
        for id in self.collections.clone() {
            let Some(&pos) = self.positions.get(&id) else {
                continue;
            };
            let features = self
                .resolve(&self.documents[pos].children)
                .fold(Features::default(), |acc, child| acc.union(child.features));
            self.documents[pos].features = features;
        }
    }

    /// Render every document.
    ///
    /// Documents whose render recorded an error keep their partial HTML and
    /// the error, and are returned as failures. An asset conflict aborts the
    /// whole pass.
    pub fn render_all(
        &mut self,
        assets: &mut AssetRegistry,
        ctx: &RenderContext<'_>,
    ) -> Result<Vec<RenderFailure>, AssetError> {
        let rendered = {
            let index = self.index();
            self.documents
                .iter()
                .map(|doc| markup::render(doc, &index, assets, ctx))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut failures = Vec::new();
        for (doc, output) in self.documents.iter_mut().zip(rendered) {
            doc.content = output.html;
            doc.features.uses_math |= output.uses_math;
            if let Some(error) = &output.error {
                failures.push(RenderFailure {
                    id: doc.id.clone(),
                    error: error.clone(),
                });
            }
            doc.render_error = output.error;
        }

        self.refresh_collection_features();
        Ok(failures)
    }
}

fn link_parents(
    documents: &mut [Document],
    positions: &HashMap<DocumentId, usize>,
) -> Result<(), GraphError> {
    for child in 0..documents.len() {
        let Some(parent_id) = documents[child].parent_id.clone() else {
            continue;
        };
        let Some(&parent) = positions.get(&parent_id) else {
            return Err(GraphError::UnresolvedParent {
                document: documents[child].display_name(),
                parent: parent_id.to_string(),
            });
        };
        let child_id = documents[child].id.clone();
        documents[parent].children.push(child_id);
        documents[child].parent = Some(parent_id);
    }
    Ok(())
}

fn reject_cycles(
    documents: &[Document],
    positions: &HashMap<DocumentId, usize>,
) -> Result<(), GraphError> {
    for doc in documents {
        let mut steps = 0;
        let mut next = doc.parent.as_ref();
        while let Some(id) = next {
            if id == &doc.id || steps > documents.len() {
                return Err(GraphError::ParentCycle {
                    document: doc.display_name(),
                });
            }
            steps += 1;
            next = positions
                .get(id)
                .and_then(|&i| documents[i].parent.as_ref());
        }
    }
    Ok(())
}
