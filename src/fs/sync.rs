//! Runs the disk side of tree operations.
//!
//! Each operation awaits its gateway calls in order and hands back one value
//! for the store to apply, so a failure at any step leaves the store as it
//! was.

use std::sync::Arc;

use tracing::warn;

use crate::error::Result;
use crate::fs::gateway::{DirectoryGateway, LocalGateway, MutationGateway};
use crate::fs::node::{DirEntry, NodeKind};
use crate::fs::tree::{FetchRequest, Mutation, MutationOutcome, MutationPlan};

/// Shared handles to the directory and mutation gateways.
#[derive(Clone)]
pub struct Gateways {
    pub directory: Arc<dyn DirectoryGateway>,
    pub mutation: Arc<dyn MutationGateway>,
}

impl Gateways {
    pub fn new(directory: Arc<dyn DirectoryGateway>, mutation: Arc<dyn MutationGateway>) -> Self {
        Self {
            directory,
            mutation,
        }
    }

    /// Both roles served by one local-disk gateway.
    pub fn local(gateway: LocalGateway) -> Self {
        let gateway = Arc::new(gateway);
        Self::new(gateway.clone(), gateway)
    }

    /// List a directory the store asked to expand.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Vec<DirEntry>> {
        self.directory.list(&request.path).await
    }

    /// List a folder about to become the new root.
    pub async fn open_root(&self, root: &str) -> Result<Vec<DirEntry>> {
        self.directory.list(root).await
    }

    /// Perform the mutation, then re-list the plan's refresh directory.
    pub async fn execute(&self, plan: &MutationPlan) -> Result<MutationOutcome> {
        let result_path = match &plan.mutation {
            Mutation::CreateFile { parent } => Some(self.mutation.create_file(parent).await?),
            Mutation::CreateDirectory { parent } => {
                Some(self.mutation.create_directory(parent).await?)
            }
            Mutation::Rename { from, to } => Some(self.mutation.rename(from, to).await?),
            Mutation::Delete { path, kind } => {
                match kind {
                    NodeKind::File => self.mutation.delete_file(path).await?,
                    NodeKind::Directory => self.mutation.delete_directory(path).await?,
                }
                None
            }
        };

        let listing = self
            .directory
            .list(&plan.refresh_dir)
            .await
            .inspect_err(|e| {
                warn!(dir = %plan.refresh_dir, error = %e, "mutation done but refresh listing failed");
            })?;

        Ok(MutationOutcome {
            path: result_path,
            listing,
        })
    }
}
