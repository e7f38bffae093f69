use std::collections::HashSet;

use sea_orm::sea_query::LikeExpr;
use sea_orm::*;

use crate::models::shared::escape_like;
use crate::utils::text::slugify;

const FALLBACK_SLUG: &str = "untitled";

/// First of `base`, `base-2`, `base-3`, ... not in `taken`.
pub fn next_free(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2u64..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Derive a slug from `title` that no other row of `E` uses.
///
/// `exclude_id` is the row being updated, whose own slug does not count as
/// taken. The unique index on the slug column still guards concurrent
/// writers; a lost race surfaces as `Conflict`.
pub async fn unique_slug<E, C>(
    db: &C,
    slug_col: E::Column,
    id_col: E::Column,
    title: &str,
    exclude_id: Option<&str>,
) -> Result<String, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut base = slugify(title);
    if base.is_empty() {
        base = FALLBACK_SLUG.to_string();
    }

    let mut select = E::find().select_only().column(slug_col).filter(
        Condition::any()
            .add(slug_col.eq(base.as_str()))
            .add(slug_col.like(LikeExpr::new(format!("{}-%", escape_like(&base))).escape('\\'))),
    );
    if let Some(id) = exclude_id {
        select = select.filter(id_col.ne(id));
    }

    let taken: HashSet<String> = select.into_tuple::<String>().all(db).await?.into_iter().collect();
    Ok(next_free(&base, &taken))
}
