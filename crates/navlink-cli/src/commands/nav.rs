//! `poi` and `route` commands

use super::print_json;
use crate::args::{PoiArgs, RouteArgs};
use anyhow::{Context, Result};
use navlink_core::{LatLon, NavConfig, PoiQuery, RouteQuery, build_provider};

pub async fn poi(config: &NavConfig, args: &PoiArgs) -> Result<()> {
    let provider = build_provider(config);
    let query = PoiQuery {
        center: LatLon::new(args.lat, args.lon),
        query: args.query.clone(),
        radius_m: args.radius,
        limit: args.limit,
    };

    let list = provider
        .search_poi(&query)
        .await
        .with_context(|| format!("POI search for {:?} failed", args.query))?;
    print_json(&list)
}

pub async fn route(config: &NavConfig, args: &RouteArgs) -> Result<()> {
    let provider = build_provider(config);
    let query = RouteQuery {
        origin: args.from,
        destination: args.to,
        mode: args.mode.clone(),
        avoid: args.avoid.clone(),
    };

    let route = provider
        .plan_route(&query)
        .await
        .context("Route planning failed")?;
    print_json(&route)
}
