use crate::error::ApiError;
use crate::state::AppState;
use crate::store::StoredObject;
use anyhow::Context;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Uri},
    response::Response,
};
use object_store::Attribute;

/// `Cache-Control` stamped on every served object. Content is addressed by
/// key, so a year-long public lifetime is safe.
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=31536000";

/// GET handler for every path - stream back the object stored under the key
///
/// The key is the raw request path minus its leading separator, kept
/// verbatim: no percent-decoding, no normalization. Headers recorded when
/// the object was written come back with it, plus the entity tag the store
/// reports; the cache-control override always wins.
pub async fn get_handler(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, ApiError> {
    // Drop exactly the leading separator; everything after it is the key.
    // Matched paths always start with one, so the slice cannot panic.
    let key = &uri.path()[1..];

    match state.store.get(key).await? {
        Some(object) => {
            let StoredObject {
                stream,
                meta,
                attributes,
            } = object;

            let mut response = Response::new(Body::from_stream(stream));
            let headers = response.headers_mut();

            for (attribute, value) in attributes.iter() {
                let name = match attribute {
                    Attribute::CacheControl => header::CACHE_CONTROL,
                    Attribute::ContentDisposition => header::CONTENT_DISPOSITION,
                    Attribute::ContentEncoding => header::CONTENT_ENCODING,
                    Attribute::ContentLanguage => header::CONTENT_LANGUAGE,
                    Attribute::ContentType => header::CONTENT_TYPE,
                    // Custom key/value metadata is not part of the recorded
                    // HTTP headers.
                    _ => continue,
                };
                let value = HeaderValue::from_str(value)
                    .with_context(|| format!("Recorded {} value is not a valid header", name))?;
                headers.insert(name, value);
            }

            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.size));

            if let Some(e_tag) = &meta.e_tag {
                let value = HeaderValue::from_str(e_tag)
                    .context("Store-reported entity tag is not a valid header")?;
                headers.insert(header::ETAG, value);
            }

            // Always wins, even over a cache-control recorded at write time.
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(CACHE_CONTROL_VALUE),
            );

            Ok(response)
        }
        None => Err(ApiError::KeyNotFound),
    }
}
