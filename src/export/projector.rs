//! Record projection
//!
//! Turns one user into one row of cell strings, positionally aligned with the
//! requested [`FieldSpec`]. Field names are resolved once, when the projector
//! is built; projecting a record never fails, a cell that cannot be produced
//! is left empty.

use tracing::{trace, warn};

use crate::error::ProjectionError;
use crate::model::User;

use super::fields::{self, Accessor, FieldSpec};

/// One output row
pub type Row = Vec<String>;

/// A requested column with its resolved accessor
struct Column {
    requested: String,
    resolved: Option<(&'static str, Accessor)>,
}

impl Column {
    fn extract(&self, user: &User) -> Result<String, ProjectionError> {
        let (canonical, accessor) = self
            .resolved
            .ok_or_else(|| ProjectionError::UnknownField(self.requested.clone()))?;

        accessor(user)
            .render()
            .map_err(|e| ProjectionError::Serialize {
                field: canonical.to_string(),
                message: e.to_string(),
            })
    }
}

/// Projects users onto a fixed column layout
pub struct Projector {
    spec: FieldSpec,
    columns: Vec<Column>,
}

impl Projector {
    /// Create a projector for the given field layout
    ///
    /// Unknown field names are reported once here; their columns stay in
    /// the layout and are always empty.
    pub fn new(spec: FieldSpec) -> Self {
        let mut columns = Vec::with_capacity(spec.len());

        for requested in spec.names() {
            let resolved = fields::resolve(requested);
            if resolved.is_none() && !columns.iter().any(|c: &Column| &c.requested == requested) {
                warn!("Unknown field '{}', column will be empty", requested);
            }
            columns.push(Column {
                requested: requested.clone(),
                resolved,
            });
        }

        Self { spec, columns }
    }

    /// Header row: the requested field names, verbatim
    pub fn header(&self) -> &[String] {
        self.spec.names()
    }

    /// Project one user into a row
    ///
    /// # Arguments
    /// * `user` - User to project
    ///
    /// # Returns
    /// * `Row` - One cell per requested field, in order
    pub fn project(&self, user: &User) -> Row {
        self.columns
            .iter()
            .map(|column| match column.extract(user) {
                Ok(value) => value,
                Err(ProjectionError::UnknownField(name)) => {
                    trace!("Skipping unknown field '{}'", name);
                    String::new()
                }
                Err(e) => {
                    warn!(
                        "{} (user {})",
                        e,
                        user.user_id.as_deref().unwrap_or("<unknown>")
                    );
                    String::new()
                }
            })
            .collect()
    }

    /// Attribute names to request from the API
    ///
    /// The well-known fields first, then every other resolvable requested
    /// field in first-seen order, without duplicates. Unknown names are
    /// left out.
    pub fn api_fields(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let resolved = self.columns.iter().filter_map(|c| c.resolved.map(|(n, _)| n));

        for name in fields::well_known().iter().map(|(n, _)| *n).chain(resolved) {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }

        names
    }
}
