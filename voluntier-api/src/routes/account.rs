/// Account endpoints
///
/// - `GET  /account` - Current account details for the edit form
/// - `POST /account` - Update username, skills, contact info and picture
///   (`multipart/form-data`; the picture part is optional)

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use voluntier_shared::{
    auth::identity::AuthContext,
    services::accounts::{self, AccountInput, AccountView, PictureUpload},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

pub async fn account(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<AccountView>> {
    Ok(Json(accounts::account(&state.db, &ctx).await?))
}

pub async fn edit_account(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let (input, picture) = read_account_form(multipart).await?;

    accounts::edit_account(&state.db, &state.pictures, &ctx, input, picture).await?;
    Ok(Redirect::to("/home").into_response())
}

async fn read_account_form(
    mut multipart: Multipart,
) -> ApiResult<(AccountInput, Option<PictureUpload>)> {
    let mut input = AccountInput::default();
    let mut picture = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "picture" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read picture: {}", e)))?;

            // Browsers send an empty part when no file was chosen
            if !filename.is_empty() && !bytes.is_empty() {
                picture = Some(PictureUpload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;

        match name.as_str() {
            "username" => input.username = value,
            "skills" => input.skills = Some(value),
            "contact_info" => input.contact_info = Some(value),
            _ => {}
        }
    }

    Ok((input, picture))
}
