#![allow(clippy::result_large_err)]

use crate::core::config::HarnessConfig;
use crate::core::error::AppError;
use crate::core::transform::Transform;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// One registered pipeline stage.
#[derive(Clone)]
pub struct BlockDescriptor {
    pub name: String,
    pub description: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub transform: Arc<dyn Transform>,
}

impl BlockDescriptor {
    pub fn new<N: Into<String>>(name: N, transform: Arc<dyn Transform>) -> Self {
        BlockDescriptor {
            name: name.into(),
            description: String::new(),
            inputs: vec![],
            outputs: vec![],
            transform,
        }
    }

    pub fn with_description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Debug for BlockDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDescriptor")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("transform", &self.transform.kind())
            .finish()
    }
}

impl PartialEq for BlockDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && Arc::ptr_eq(&self.transform, &other.transform)
    }
}

/// Immutable catalog of blocks. Iteration order is pipeline stage order.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: IndexMap<String, BlockDescriptor>,
}

impl BlockRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(blocks: Vec<BlockDescriptor>) -> Result<Self, AppError> {
        let mut map = IndexMap::with_capacity(blocks.len());
        for block in blocks {
            if map.contains_key(&block.name) {
                return Err(AppError::validation(format!(
                    "block {} is registered more than once",
                    block.name
                )));
            }
            map.insert(block.name.clone(), block);
        }
        Ok(BlockRegistry { blocks: map })
    }

    pub fn from_config(config: &HarnessConfig) -> Result<Self, AppError> {
        let blocks = config
            .blocks
            .iter()
            .map(|block| {
                BlockDescriptor::new(block.name.clone(), block.transform.build())
                    .with_description(block.description.clone())
                    .with_inputs(block.inputs.iter().cloned())
                    .with_outputs(block.outputs.iter().cloned())
            })
            .collect();
        Self::new(blocks)
    }

    pub fn list(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.blocks.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.blocks.keys().cloned().collect()
    }

    pub fn lookup(&self, name: &str) -> Result<&BlockDescriptor, AppError> {
        self.blocks
            .get(name)
            .ok_or_else(|| AppError::block_not_found(name, self.names()))
    }

    /// Position of a block in stage order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.blocks.get_index_of(name)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
