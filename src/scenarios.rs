//! The smoke scenarios: one per route under test.
//!
//! Every scenario returns the reports of the requests it made, in order.
//! Upload scenarios stop when the Sipi upload fails; the preview is informational.

use std::path::Path;

use crate::config::Config;
use crate::error::HarnessError;
use crate::harness::{
    ApiTarget, Credentials, FilePart, HarnessReport, HarnessService, HarnessServiceExt,
};
use crate::payload::{
    CreateMapping, CreateResource, FileReference, FileValueUpdate, PropertyValue, RichText,
    ThumbnailInfo,
};

const ANYTHING: &str = "http://www.knora.org/ontology/anything";
const INCUNABULA: &str = "http://www.knora.org/ontology/incunabula";
const KNORA_BASE: &str = "http://www.knora.org/ontology/knora-base";
const BEOL_PROJECT: &str = "http://rdfh.ch/projects/yTerZGyxjZVqFMNNKXCDPF";

pub const JSON_UTF8_CONTENT_TYPE: &str = "application/json; charset=utf8";
pub const XSL_CONTENT_TYPE: &str = "text/xml; charset=utf-8";
pub const STANDARD_MAPPING: &str = "http://data.knora.org/projects/standoff/mappings/StandardMapping";

pub const THING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<text>
    <u><strong>This</strong></u> <u>text</u> <a class="salsah-link" href="http://data.knora.org/9935159f67">links</a> to a thing
</text>
"#;

const V1_USER: &str = "root";
const V1_FILE_USER: &str = "root@example.com";
const BEOL_USER: &str = "t.schweizer@unibas.ch";

fn authenticated(base_url: &str, config: &Config, default_user: &str) -> ApiTarget {
    let username = config
        .username
        .clone()
        .unwrap_or_else(|| default_user.to_string());
    ApiTarget::new(base_url)
        .with_credentials(Credentials::new(username, config.password.clone()))
        .with_proxy(config.proxy.clone())
}

/// The anything:Thing with a standoff text and an integer.
pub fn thing_payload() -> CreateResource {
    CreateResource::new(
        format!("{}#Thing", ANYTHING),
        "A thing to test with",
        "http://data.knora.org/projects/anything",
    )
    .with_value(
        format!("{}#hasText", ANYTHING),
        PropertyValue::RichtextValue(RichText::Xml {
            xml: THING_XML.to_string(),
            mapping_id: STANDARD_MAPPING.to_string(),
        }),
    )
    .with_value(format!("{}#hasInteger", ANYTHING), PropertyValue::IntValue(12345))
}

/// An incunabula page, optionally pointing at a file already in Sipi.
pub fn page_payload(file: Option<FileReference>) -> CreateResource {
    let page = CreateResource::new(
        format!("{}#page", INCUNABULA),
        "test page",
        "http://data.knora.org/projects/77275339",
    )
    .with_value(
        format!("{}#pagenum", INCUNABULA),
        PropertyValue::RichtextValue(RichText::plain("test page")),
    )
    .with_value(
        format!("{}#origname", INCUNABULA),
        PropertyValue::RichtextValue(RichText::plain("Chlaus")),
    )
    .with_value(
        format!("{}#partOf", INCUNABULA),
        PropertyValue::LinkValue("http://data.knora.org/5e77e98d2603".to_string()),
    )
    .with_value(format!("{}#seqnum", INCUNABULA), PropertyValue::IntValue(99999999));

    match file {
        Some(file) => page.with_file(file),
        None => page,
    }
}

/// Known mapping definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MappingPreset {
    Tei,
    BeolTei,
}

impl MappingPreset {
    pub fn mapping(&self) -> CreateMapping {
        let (name, project) = match self {
            MappingPreset::Tei => ("TEIMapping", "http://rdfh.ch/projects/0001"),
            MappingPreset::BeolTei => ("BEOLTEIMapping", BEOL_PROJECT),
        };
        CreateMapping {
            name: name.to_string(),
            project: project.to_string(),
            label: "TEI mapping".to_string(),
        }
    }

    pub fn default_user(&self) -> &'static str {
        match self {
            MappingPreset::Tei => "anything.user02@example.org",
            MappingPreset::BeolTei => BEOL_USER,
        }
    }
}

/// Form-encodes a resource IRI into one path segment.
pub fn encode_iri(iri: &str) -> String {
    url::form_urlencoded::byte_serialize(iri.as_bytes()).collect()
}

fn json_field<T: serde::Serialize>(payload: &T) -> Result<Vec<(String, String)>, HarnessError> {
    Ok(vec![("json".to_string(), serde_json::to_string(payload)?)])
}

/// POST a Thing as JSON to `{v1}/resources`.
pub async fn create_thing(service: &dyn HarnessService, config: &Config) -> Vec<HarnessReport> {
    let target = authenticated(&config.v1_url, config, V1_USER);
    let payload = match serde_json::to_value(thing_payload()) {
        Ok(payload) => payload,
        Err(e) => return vec![HarnessError::from(e).into()],
    };

    vec![
        service
            .post_json(&target, "resources", payload, Some(JSON_UTF8_CONTENT_TYPE))
            .await,
    ]
}

/// POST a mapping definition plus its XML to `{v2}/mapping`.
pub async fn create_mapping(
    service: &dyn HarnessService,
    config: &Config,
    preset: MappingPreset,
    xml: &Path,
) -> Vec<HarnessReport> {
    let target = authenticated(&config.v2_url, config, preset.default_user());
    let fields = match json_field(&preset.mapping()) {
        Ok(fields) => fields,
        Err(e) => return vec![e.into()],
    };

    vec![
        service
            .post_multipart(&target, "mapping", fields, vec![FilePart::new("xml", xml)])
            .await,
    ]
}

/// POST a page together with its image to `{v1}/resources`.
pub async fn create_page(
    service: &dyn HarnessService,
    config: &Config,
    image: &Path,
) -> Vec<HarnessReport> {
    let target = authenticated(&config.v1_url, config, V1_FILE_USER);
    let fields = match json_field(&page_payload(None)) {
        Ok(fields) => fields,
        Err(e) => return vec![e.into()],
    };

    vec![
        service
            .post_multipart(&target, "resources", fields, vec![FilePart::new("file", image)])
            .await,
    ]
}

/// PUT a replacement file for a resource to `{v1}/filevalue/{iri}`.
pub async fn change_file_value(
    service: &dyn HarnessService,
    config: &Config,
    resource_iri: &str,
    file: &Path,
) -> Vec<HarnessReport> {
    let target = authenticated(&config.v1_url, config, V1_FILE_USER);
    let path = format!("filevalue/{}", encode_iri(resource_iri));

    vec![
        service
            .put_multipart(&target, &path, Vec::new(), vec![FilePart::new("file", file)])
            .await,
    ]
}

/// Uploads `image` to Sipi and fetches its preview.
///
/// Only the upload gates the flow: the preview report is kept but a failed
/// preview still yields the thumbnail.
async fn upload_thumbnail(
    service: &dyn HarnessService,
    config: &Config,
    image: &Path,
    reports: &mut Vec<HarnessReport>,
) -> Option<ThumbnailInfo> {
    let sipi = ApiTarget::new(config.sipi_url.clone());

    let upload = service
        .post_multipart(&sipi, "make_thumbnail", Vec::new(), vec![FilePart::new("file", image)])
        .await;
    let thumbnail = upload.data.as_ref().map(|data| {
        serde_json::from_str::<ThumbnailInfo>(&data.body).map_err(|e| {
            HarnessError::InvalidResponse(format!("unexpected make_thumbnail answer: {}", e))
        })
    });
    reports.push(upload);

    let thumbnail = match thumbnail? {
        Ok(info) => info,
        Err(e) => {
            reports.push(e.into());
            return None;
        }
    };
    tracing::info!(filename = %thumbnail.filename, "Thumbnail created");

    let preview = service.get(&sipi, &thumbnail.preview_path).await;
    match (&preview.data, &preview.error) {
        (Some(data), _) => tracing::info!(status = data.status, "Got preview"),
        (None, Some(error)) => tracing::info!(status = ?error.status, "Preview not available"),
        (None, None) => {}
    }
    reports.push(preview);

    Some(thumbnail)
}

/// Upload to Sipi, fetch the preview, then create a page referencing the upload.
pub async fn create_page_from_upload(
    service: &dyn HarnessService,
    config: &Config,
    image: &Path,
) -> Vec<HarnessReport> {
    let mut reports = Vec::with_capacity(3);
    let thumbnail = match upload_thumbnail(service, config, image, &mut reports).await {
        Some(info) => info,
        None => return reports,
    };

    let target = authenticated(&config.v1_url, config, V1_FILE_USER);
    let payload = match serde_json::to_value(page_payload(Some(thumbnail.into()))) {
        Ok(payload) => payload,
        Err(e) => {
            reports.push(HarnessError::from(e).into());
            return reports;
        }
    };
    reports.push(
        service
            .post_json(&target, "resources", payload, Some(JSON_UTF8_CONTENT_TYPE))
            .await,
    );
    reports
}

/// Upload to Sipi, fetch the preview, then point an existing resource at the upload.
pub async fn change_file_value_from_upload(
    service: &dyn HarnessService,
    config: &Config,
    resource_iri: &str,
    image: &Path,
) -> Vec<HarnessReport> {
    let mut reports = Vec::with_capacity(3);
    let thumbnail = match upload_thumbnail(service, config, image, &mut reports).await {
        Some(info) => info,
        None => return reports,
    };

    let target = authenticated(&config.v1_url, config, V1_FILE_USER);
    let path = format!("filevalue/{}", encode_iri(resource_iri));
    let payload = match serde_json::to_value(FileValueUpdate {
        file: thumbnail.into(),
    }) {
        Ok(payload) => payload,
        Err(e) => {
            reports.push(HarnessError::from(e).into());
            return reports;
        }
    };
    reports.push(
        service
            .put_json(&target, &path, payload, Some(JSON_UTF8_CONTENT_TYPE))
            .await,
    );
    reports
}

/// The XSL transformation resource the BEOL header mapping refers to.
pub fn xsl_transformation_payload() -> CreateResource {
    CreateResource::new(
        format!("{}#XSLTransformation", KNORA_BASE),
        "XSLT",
        BEOL_PROJECT,
    )
}

/// POST an XSL transformation together with its stylesheet to `{v1}/resources`.
pub async fn create_xsl_transformation(
    service: &dyn HarnessService,
    config: &Config,
    xsl: &Path,
) -> Vec<HarnessReport> {
    let target = authenticated(&config.v1_url, config, BEOL_USER);
    let fields = match json_field(&xsl_transformation_payload()) {
        Ok(fields) => fields,
        Err(e) => return vec![e.into()],
    };

    vec![
        service
            .post_multipart(
                &target,
                "resources",
                fields,
                vec![FilePart::new("file", xsl).with_mime_type(XSL_CONTENT_TYPE)],
            )
            .await,
    ]
}
