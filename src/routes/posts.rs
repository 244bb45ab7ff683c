use axum::Extension;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::storage::Image;
use crate::types::request::SearchParams;
use crate::types::{AuthorizedUser, Location, Post};

#[instrument(skip_all)]
pub(crate) async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(), Error> {
    let mut multipart = multipart?;

    let mut message = None;
    let mut lat = None;
    let mut lon = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);

        match name.as_deref() {
            Some("message") => message = Some(field.text().await?),
            Some("lat") => lat = Some(parse_coordinate("lat", &field.text().await?)?),
            Some("lon") => lon = Some(parse_coordinate("lon", &field.text().await?)?),
            Some("image") => {
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await?;

                if !data.is_empty() {
                    image = Some(Image { content_type, data });
                }
            }
            _ => (),
        }
    }

    let location = Location {
        lat: lat.ok_or_else(|| Error::MalformedRequest("missing lat".into()))?,
        lon: lon.ok_or_else(|| Error::MalformedRequest("missing lon".into()))?,
    };

    let message = message.unwrap_or_default();

    tracing::info!("Received one post request from {}: {}", user.username, message);

    state
        .post_controller
        .create(&user.username, message, location, image)
        .await?;

    Ok(())
}

#[instrument(skip_all)]
pub(crate) async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Post>>, Error> {
    let Query(params) = params?;

    let center = params.center()?;
    let range_km = params.range_km()?;

    let posts = state.post_controller.search(center, range_km).await?;

    Ok(Json(posts))
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64, Error> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::MalformedRequest(format!("invalid {name}: {value}")))
}
