use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;

use crate::entity::{
    article, banner, career, documentation, event, partner, pillar, sub_pillar, team,
    volunteer,
};
use crate::models::shared::{ListQuery, Paged, escape_like};

/// Taxonomy label for records without a pillar or subpillar.
pub const UNCATEGORIZED: &str = "Lainnya";

/// Filter values that select uncategorized records.
const UNCATEGORIZED_SENTINELS: [&str; 2] = [UNCATEGORIZED, "other"];

/// Which audience a read is served to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Public site: active records only, `filter` rule applies.
    Public,
    /// Admin console: everything, `q` title search applies.
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// How the public `filter` parameter narrows a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterRule {
    /// Records with neither a pillar nor a subpillar.
    Uncategorized,
    /// No content filter, only an ordering override on creation time.
    Sort(SortDirection),
    /// Title, pillar slug or subpillar slug contains the term (case-sensitive).
    Contains(String),
}

impl FilterRule {
    pub fn parse(filter: Option<&str>) -> Self {
        let Some(term) = filter.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::Uncategorized;
        };
        if UNCATEGORIZED_SENTINELS.contains(&term) {
            return Self::Uncategorized;
        }
        match term {
            "asc" => Self::Sort(SortDirection::Asc),
            "desc" => Self::Sort(SortDirection::Desc),
            _ => Self::Contains(term.to_string()),
        }
    }
}

/// 1-based page number. Missing, non-numeric and zero all mean page 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// A resource kind the listing engine can page through.
pub trait Listable: EntityTrait {
    const PUBLIC_PAGE_SIZE: u64;
    const ADMIN_PAGE_SIZE: u64;

    /// Column searched by `q` and by the `filter` substring rule.
    fn title_column() -> Self::Column;
    fn created_at_column() -> Self::Column;

    /// `is_active` flag; kinds without one are always public.
    fn active_column() -> Option<Self::Column> {
        None
    }

    /// `(pillar_id, sub_pillar_id)` for kinds that carry taxonomy references.
    fn taxonomy_columns() -> Option<(Self::Column, Self::Column)> {
        None
    }
}

/// Predicate, ordering and slice shared by the count and the page query.
#[derive(Clone, Debug)]
pub struct ListPlan {
    pub condition: Condition,
    pub order: Order,
    pub page: u64,
    pub page_size: u64,
}

impl ListPlan {
    /// Rows skipped before this page. `None` when the offset cannot be bound
    /// as a signed 64-bit parameter; no table is that large.
    pub fn offset(&self) -> Option<u64> {
        (self.page - 1)
            .checked_mul(self.page_size)
            .filter(|offset| i64::try_from(*offset).is_ok())
    }
}

fn contains_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(term))).escape('\\')
}

/// Build the listing plan for kind `E`.
pub fn plan<E: Listable>(visibility: Visibility, query: &ListQuery) -> ListPlan {
    let page = parse_page(query.page.as_deref());
    let mut condition = Condition::all();
    let mut order = Order::Desc;

    match visibility {
        Visibility::Admin => {
            if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                condition = condition.add(
                    Expr::expr(Func::lower(Expr::col(E::title_column())))
                        .like(contains_pattern(&search.to_lowercase())),
                );
            }
        }
        Visibility::Public => {
            if let Some(active) = E::active_column() {
                condition = condition.add(active.eq(true));
            }
            match FilterRule::parse(query.filter.as_deref()) {
                FilterRule::Uncategorized => {
                    if let Some((pillar_col, sub_col)) = E::taxonomy_columns() {
                        condition = condition.add(pillar_col.is_null()).add(sub_col.is_null());
                    }
                }
                FilterRule::Sort(direction) => order = direction.into(),
                FilterRule::Contains(term) => {
                    let mut any = Condition::any().add(E::title_column().like(contains_pattern(&term)));
                    if let Some((pillar_col, sub_col)) = E::taxonomy_columns() {
                        any = any
                            .add(
                                pillar_col.in_subquery(
                                    SeaQuery::select()
                                        .column(pillar::Column::Id)
                                        .from(pillar::Entity)
                                        .and_where(pillar::Column::Slug.like(contains_pattern(&term)))
                                        .to_owned(),
                                ),
                            )
                            .add(
                                sub_col.in_subquery(
                                    SeaQuery::select()
                                        .column(sub_pillar::Column::Id)
                                        .from(sub_pillar::Entity)
                                        .and_where(
                                            sub_pillar::Column::Slug.like(contains_pattern(&term)),
                                        )
                                        .to_owned(),
                                ),
                            );
                    }
                    condition = condition.add(any);
                }
            }
        }
    }

    let page_size = match visibility {
        Visibility::Public => E::PUBLIC_PAGE_SIZE,
        Visibility::Admin => E::ADMIN_PAGE_SIZE,
    };

    ListPlan {
        condition,
        order,
        page,
        page_size,
    }
}

/// Count and slice `E` under `plan` inside one read-only, repeatable-read
/// transaction, so both numbers come from the same snapshot.
pub async fn fetch_page<E: Listable>(
    db: &DatabaseConnection,
    plan: &ListPlan,
) -> Result<Paged<E::Model>, DbErr>
where
    E::Model: Sync,
{
    let txn = db
        .begin_with_config(
            Some(IsolationLevel::RepeatableRead),
            Some(AccessMode::ReadOnly),
        )
        .await?;

    let select = E::find().filter(plan.condition.clone());

    let total = select
        .clone()
        .paginate(&txn, plan.page_size)
        .num_items()
        .await?;

    let items = match plan.offset().filter(|offset| *offset < total) {
        Some(offset) => {
            select
                .order_by(E::created_at_column(), plan.order.clone())
                .offset(Some(offset))
                .limit(Some(plan.page_size))
                .all(&txn)
                .await?
        }
        None => Vec::new(),
    };

    txn.commit().await?;

    Ok(Paged::new(items, plan.page, total, plan.page_size))
}

/// Convenience wrapper: plan and fetch in one call.
pub async fn list<E: Listable>(
    db: &DatabaseConnection,
    visibility: Visibility,
    query: &ListQuery,
) -> Result<Paged<E::Model>, DbErr>
where
    E::Model: Sync,
{
    fetch_page::<E>(db, &plan::<E>(visibility, query)).await
}

impl Listable for article::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 8;
    const ADMIN_PAGE_SIZE: u64 = 8;

    fn title_column() -> Self::Column {
        article::Column::Title
    }
    fn created_at_column() -> Self::Column {
        article::Column::CreatedAt
    }
    fn active_column() -> Option<Self::Column> {
        Some(article::Column::IsActive)
    }
    fn taxonomy_columns() -> Option<(Self::Column, Self::Column)> {
        Some((article::Column::PillarId, article::Column::SubPillarId))
    }
}

impl Listable for event::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 8;
    const ADMIN_PAGE_SIZE: u64 = 8;

    fn title_column() -> Self::Column {
        event::Column::Title
    }
    fn created_at_column() -> Self::Column {
        event::Column::CreatedAt
    }
    fn active_column() -> Option<Self::Column> {
        Some(event::Column::IsActive)
    }
    fn taxonomy_columns() -> Option<(Self::Column, Self::Column)> {
        Some((event::Column::PillarId, event::Column::SubPillarId))
    }
}

impl Listable for documentation::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 9;
    const ADMIN_PAGE_SIZE: u64 = 9;

    fn title_column() -> Self::Column {
        documentation::Column::Title
    }
    fn created_at_column() -> Self::Column {
        documentation::Column::CreatedAt
    }
    fn active_column() -> Option<Self::Column> {
        Some(documentation::Column::IsActive)
    }
    fn taxonomy_columns() -> Option<(Self::Column, Self::Column)> {
        Some((
            documentation::Column::PillarId,
            documentation::Column::SubPillarId,
        ))
    }
}

impl Listable for volunteer::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 8;
    const ADMIN_PAGE_SIZE: u64 = 8;

    fn title_column() -> Self::Column {
        volunteer::Column::Title
    }
    fn created_at_column() -> Self::Column {
        volunteer::Column::CreatedAt
    }
    fn active_column() -> Option<Self::Column> {
        Some(volunteer::Column::IsActive)
    }
    fn taxonomy_columns() -> Option<(Self::Column, Self::Column)> {
        Some((volunteer::Column::PillarId, volunteer::Column::SubPillarId))
    }
}

impl Listable for career::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 6;
    const ADMIN_PAGE_SIZE: u64 = 8;

    fn title_column() -> Self::Column {
        career::Column::Title
    }
    fn created_at_column() -> Self::Column {
        career::Column::CreatedAt
    }
    fn active_column() -> Option<Self::Column> {
        Some(career::Column::IsActive)
    }
    fn taxonomy_columns() -> Option<(Self::Column, Self::Column)> {
        Some((career::Column::PillarId, career::Column::SubPillarId))
    }
}

impl Listable for banner::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 5;
    const ADMIN_PAGE_SIZE: u64 = 5;

    fn title_column() -> Self::Column {
        banner::Column::Alt
    }
    fn created_at_column() -> Self::Column {
        banner::Column::CreatedAt
    }
}

impl Listable for partner::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 5;
    const ADMIN_PAGE_SIZE: u64 = 5;

    fn title_column() -> Self::Column {
        partner::Column::Alt
    }
    fn created_at_column() -> Self::Column {
        partner::Column::CreatedAt
    }
}

impl Listable for team::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 5;
    const ADMIN_PAGE_SIZE: u64 = 5;

    fn title_column() -> Self::Column {
        team::Column::Fullname
    }
    fn created_at_column() -> Self::Column {
        team::Column::CreatedAt
    }
}

impl Listable for pillar::Entity {
    const PUBLIC_PAGE_SIZE: u64 = 5;
    const ADMIN_PAGE_SIZE: u64 = 5;

    fn title_column() -> Self::Column {
        pillar::Column::Name
    }
    fn created_at_column() -> Self::Column {
        pillar::Column::CreatedAt
    }
}
