pub mod bot_routes;
pub mod group_routes;
