use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::*;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(general_routes())
        .nest("/articles", article_routes())
        .nest("/events", event_routes())
        .nest("/docs", documentation_routes())
        .nest("/volunteers", volunteer_routes())
        .nest("/careers", career_routes())
        .nest("/banners", banner_routes())
        .nest("/partners", partner_routes())
        .nest("/teams", team_routes())
        .nest("/pillars", pillar_routes())
        .nest("/positions", position_routes())
        .nest("/keys", access_key_routes())
        .nest("/admins", admin_routes())
}

fn general_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(general::homepage))
        .routes(routes!(general::dashboard))
        .routes(routes!(general::upload_content_image))
}

fn article_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(article::list_articles, article::create_article))
        .routes(routes!(
            article::get_article,
            article::update_article,
            article::delete_article
        ))
}

fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(event::list_events, event::create_event))
        .routes(routes!(
            event::get_event,
            event::update_event,
            event::delete_event
        ))
}

fn documentation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            documentation::list_documentation,
            documentation::create_documentation
        ))
        .routes(routes!(
            documentation::get_documentation,
            documentation::update_documentation,
            documentation::delete_documentation
        ))
        .routes(routes!(documentation::add_documentation_images))
        .routes(routes!(documentation::delete_documentation_image))
}

fn volunteer_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(volunteer::list_volunteers, volunteer::create_volunteer))
        .routes(routes!(
            volunteer::get_volunteer,
            volunteer::update_volunteer,
            volunteer::delete_volunteer
        ))
        .routes(routes!(
            volunteer::apply_volunteer,
            volunteer::list_volunteer_applicants
        ))
        .routes(routes!(volunteer::toggle_volunteer_approval))
}

fn career_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(career::list_careers, career::create_career))
        .routes(routes!(
            career::get_career,
            career::update_career,
            career::delete_career
        ))
        .routes(routes!(career::apply_career, career::list_career_applicants))
        .routes(routes!(career::toggle_career_approval))
}

fn banner_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(banner::list_banners, banner::create_banner))
        .routes(routes!(
            banner::get_banner,
            banner::update_banner,
            banner::delete_banner
        ))
}

fn partner_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(partner::list_partners, partner::create_partner))
        .routes(routes!(
            partner::get_partner,
            partner::update_partner,
            partner::delete_partner
        ))
}

fn team_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(team::list_teams, team::create_team))
        .routes(routes!(team::get_team, team::update_team, team::delete_team))
        .routes(routes!(team::delete_team_education))
        .routes(routes!(team::delete_team_social))
}

fn pillar_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(pillar::list_pillars, pillar::create_pillar))
        .routes(routes!(
            pillar::get_pillar,
            pillar::update_pillar,
            pillar::delete_pillar
        ))
        .routes(routes!(pillar::delete_sub_pillar))
}

fn position_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(position::list_positions, position::create_position))
        .routes(routes!(position::update_position, position::delete_position))
}

fn access_key_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            access_key::list_access_keys,
            access_key::create_access_key
        ))
        .routes(routes!(access_key::delete_access_key))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(admin::list_admins, admin::create_admin))
        .routes(routes!(
            admin::get_admin,
            admin::update_admin,
            admin::delete_admin
        ))
}
