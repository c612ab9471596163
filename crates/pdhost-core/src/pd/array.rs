//! Array - named view into a float table

use super::instance::Instance;

/// Named reference to a table owned by an instance
///
/// Resolved by name on every access, so it follows the table across
/// resizes and reads empty once the table is gone.
#[derive(Debug, Clone)]
pub struct Array<'a> {
    name: String,
    instance: &'a Instance,
}

impl<'a> Array<'a> {
    pub(crate) fn new(name: impl Into<String>, instance: &'a Instance) -> Self {
        Self {
            name: name.into(),
            instance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid(&self) -> bool {
        self.instance
            .with_context(|graph| graph.find_array(&self.name).is_some())
    }

    pub fn size(&self) -> usize {
        self.instance
            .with_context(|graph| graph.find_array(&self.name).map_or(0, |a| a.data.len()))
    }

    /// Copy of the table contents
    pub fn read(&self) -> Vec<f32> {
        self.instance.with_context(|graph| {
            graph
                .find_array(&self.name)
                .map(|a| a.data.clone())
                .unwrap_or_default()
        })
    }
}
