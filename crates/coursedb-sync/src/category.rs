//! Category resolution for candidate courses.

use crate::config::LocalCategoryField;
use crate::error::SyncResult;
use crate::store::CourseStore;
use crate::types::{CategoryId, ResolvedCategory};

/// Outcome of resolving a candidate's category reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryResolution {
    /// A usable category id.
    Resolved(ResolvedCategory),
    /// The supplied reference matches no local category; the row must be
    /// skipped.
    Rejected {
        /// The unresolvable reference, for the trace.
        reference: String,
    },
}

/// Resolve a candidate's category.
///
/// A row that supplies no category value falls back to the default category.
/// A row that supplies a value which resolves to no local category is
/// rejected outright — placing the course in the default category instead
/// could expose it to the wrong audience.
pub async fn resolve<S: CourseStore + ?Sized>(
    store: &S,
    field: LocalCategoryField,
    category_ref: Option<&str>,
    default_category: CategoryId,
) -> SyncResult<CategoryResolution> {
    let Some(reference) = category_ref else {
        return Ok(CategoryResolution::Resolved(ResolvedCategory {
            id: default_category,
            explicit: false,
        }));
    };

    match store.find_category(field, reference).await? {
        Some(id) => Ok(CategoryResolution::Resolved(ResolvedCategory {
            id,
            explicit: true,
        })),
        None => Ok(CategoryResolution::Rejected {
            reference: reference.to_string(),
        }),
    }
}
