use std::collections::{BTreeSet, HashMap};

use sea_orm::prelude::Expr;
use sea_orm::*;

use super::listing::{Listable, UNCATEGORIZED};
use crate::entity::{article, career, documentation, event, pillar, sub_pillar, volunteer};
use crate::error::AppError;

/// Display names for the pillars and subpillars a batch of records points at.
#[derive(Debug, Default)]
pub struct TaxonomyNames {
    pillars: HashMap<String, String>,
    sub_pillars: HashMap<String, String>,
}

impl TaxonomyNames {
    /// Resolve every `(pillar_id, sub_pillar_id)` pair with two queries.
    pub async fn load<'a, C, I>(db: &C, refs: I) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
        I: IntoIterator<Item = (&'a Option<String>, &'a Option<String>)>,
    {
        let mut pillar_ids = BTreeSet::new();
        let mut sub_pillar_ids = BTreeSet::new();
        for (pillar_id, sub_pillar_id) in refs {
            if let Some(id) = pillar_id {
                pillar_ids.insert(id.clone());
            }
            if let Some(id) = sub_pillar_id {
                sub_pillar_ids.insert(id.clone());
            }
        }

        let mut names = Self::default();
        if !pillar_ids.is_empty() {
            names.pillars = pillar::Entity::find()
                .filter(pillar::Column::Id.is_in(pillar_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect();
        }
        if !sub_pillar_ids.is_empty() {
            names.sub_pillars = sub_pillar::Entity::find()
                .filter(sub_pillar::Column::Id.is_in(sub_pillar_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect();
        }
        Ok(names)
    }

    /// Name of the referenced pillar, or `"Lainnya"` when unset or dangling.
    pub fn pillar(&self, id: &Option<String>) -> String {
        lookup(&self.pillars, id)
    }

    pub fn sub_pillar(&self, id: &Option<String>) -> String {
        lookup(&self.sub_pillars, id)
    }
}

fn lookup(names: &HashMap<String, String>, id: &Option<String>) -> String {
    id.as_ref()
        .and_then(|id| names.get(id))
        .cloned()
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

/// Reject references to a missing pillar or subpillar, and subpillars that
/// belong to a different pillar than the one given.
pub async fn ensure_refs<C: ConnectionTrait>(
    db: &C,
    pillar_id: Option<&str>,
    sub_pillar_id: Option<&str>,
) -> Result<(), AppError> {
    if let Some(id) = pillar_id
        && pillar::Entity::find_by_id(id.to_string()).one(db).await?.is_none()
    {
        return Err(AppError::Validation(format!("Pillar {id} does not exist")));
    }

    if let Some(id) = sub_pillar_id {
        let sub = sub_pillar::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Subpillar {id} does not exist")))?;
        if let Some(pillar_id) = pillar_id
            && sub.pillar_id != pillar_id
        {
            return Err(AppError::Validation(format!(
                "Subpillar {id} does not belong to pillar {pillar_id}"
            )));
        }
    }
    Ok(())
}

async fn clear_refs<E, C>(db: &C, pillar_ids: &[String], sub_pillar_ids: &[String]) -> Result<(), DbErr>
where
    E: Listable,
    C: ConnectionTrait,
{
    let Some((pillar_col, sub_col)) = E::taxonomy_columns() else {
        return Ok(());
    };
    for (col, ids) in [(pillar_col, pillar_ids), (sub_col, sub_pillar_ids)] {
        if ids.is_empty() {
            continue;
        }
        E::update_many()
            .col_expr(col, Expr::value(Option::<String>::None))
            .filter(col.is_in(ids.iter().cloned()))
            .exec(db)
            .await?;
    }
    Ok(())
}

/// Null out references to the given pillars and subpillars on every
/// taxonomy-carrying kind, so those records read as uncategorized.
pub async fn detach<C: ConnectionTrait>(
    db: &C,
    pillar_ids: &[String],
    sub_pillar_ids: &[String],
) -> Result<(), DbErr> {
    clear_refs::<article::Entity, _>(db, pillar_ids, sub_pillar_ids).await?;
    clear_refs::<event::Entity, _>(db, pillar_ids, sub_pillar_ids).await?;
    clear_refs::<documentation::Entity, _>(db, pillar_ids, sub_pillar_ids).await?;
    clear_refs::<volunteer::Entity, _>(db, pillar_ids, sub_pillar_ids).await?;
    clear_refs::<career::Entity, _>(db, pillar_ids, sub_pillar_ids).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_fall_back_to_uncategorized() {
        let mut names = TaxonomyNames::default();
        names
            .pillars
            .insert("JPSPLR1234".into(), "Kesehatan".into());

        assert_eq!(names.pillar(&Some("JPSPLR1234".into())), "Kesehatan");
        assert_eq!(names.pillar(&Some("JPSPLR9999".into())), "Lainnya");
        assert_eq!(names.pillar(&None), "Lainnya");
        assert_eq!(names.sub_pillar(&None), "Lainnya");
    }

    #[tokio::test]
    async fn load_skips_queries_without_refs() {
        // A mock connection with no queued results would error on any query.
        let db = MockDatabase::new(DbBackend::Postgres).into_connection();
        let names = TaxonomyNames::load(&db, std::iter::empty::<(&Option<String>, &Option<String>)>()).await.unwrap();
        assert!(names.pillars.is_empty());
        assert!(names.sub_pillars.is_empty());
    }
}
