//! The single entry point that hands every request to the core dispatcher.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Form, FromRequest, Multipart, Query, Request, State},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Redirect, Response},
};
use headers::{HeaderMapExt, UserAgent};
use uniadmin::{App, ClientInfo, Outcome, RequestInput, UploadedFile};

use crate::config::{DISPLAY_TIMEZONE, UNIADMIN_BASE_PATH, strip_base_path};
use crate::error::IntoResponseError;
use crate::pages;

pub(crate) async fn dispatch(
    State(app): State<Arc<App>>,
    request: Request,
) -> Result<Response, (StatusCode, String)> {
    let base = UNIADMIN_BASE_PATH.as_str();
    let Some(path) = strip_base_path(request.uri().path(), base) else {
        return Ok(not_found());
    };

    let mut input = RequestInput::new(request.method().clone(), path);
    input.query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();
    input.client = ClientInfo {
        ip_address: request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string()),
        user_agent: request
            .headers()
            .typed_get::<UserAgent>()
            .map(|ua| ua.as_str().to_string()),
    };
    let headers = request.headers().clone();

    if request.method() == Method::POST {
        read_body(request, &mut input).await?;
    }

    let response = app.handle(&headers, input).await.into_response_error()?;

    let mut http_response = match response.outcome {
        Outcome::Redirect(target) => Redirect::to(&format!("{base}/{target}")).into_response(),
        Outcome::Render(view) => Html(
            pages::render(view, base, *DISPLAY_TIMEZONE).into_response_error()?,
        )
        .into_response(),
        Outcome::NotFound => not_found(),
    };

    for (name, value) in response.headers.iter() {
        http_response.headers_mut().append(name.clone(), value.clone());
    }
    Ok(http_response)
}

/// Fills the form fields and uploaded files from a url-encoded or multipart body.
async fn read_body(request: Request, input: &mut RequestInput) -> Result<(), (StatusCode, String)> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| (e.status(), e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| (e.status(), e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| (e.status(), e.body_text()))?;
                    input.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(|e| (e.status(), e.body_text()))?;
                    input.form.insert(name, text);
                }
            }
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|e| (e.status(), e.body_text()))?;
        input.form = form;
    }

    Ok(())
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html("<h1>404 Not Found</h1>")).into_response()
}
