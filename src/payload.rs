//! Wire payloads for the resource and mapping routes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text value of a resource property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichText {
    /// Standoff XML converted with a mapping
    Xml { xml: String, mapping_id: String },
    /// Plain string with an (empty) text attribute blob
    Plain {
        utf8str: String,
        textattr: String,
        resource_reference: Vec<String>,
    },
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        RichText::Plain {
            utf8str: text.into(),
            textattr: "{}".to_string(),
            resource_reference: Vec::new(),
        }
    }
}

/// One value of a resource property, keyed by its value type on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    RichtextValue(RichText),
    IntValue(i64),
    LinkValue(String),
}

/// File already stored in Sipi, referenced by a new resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub original_filename: String,
    pub original_mime_type: String,
    pub filename: String,
}

/// Body of a create-resource request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResource {
    pub restype_id: String,
    pub label: String,
    pub project_id: String,
    /// Property IRI to its values
    pub properties: BTreeMap<String, Vec<PropertyValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileReference>,
}

impl CreateResource {
    pub fn new(
        restype_id: impl Into<String>,
        label: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            restype_id: restype_id.into(),
            label: label.into(),
            project_id: project_id.into(),
            properties: BTreeMap::new(),
            file: None,
        }
    }

    pub fn with_value(mut self, property: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.entry(property.into()).or_default().push(value);
        self
    }

    pub fn with_file(mut self, file: FileReference) -> Self {
        self.file = Some(file);
        self
    }
}

/// Body of the `json` part of a create-mapping request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMapping {
    #[serde(rename = "http://api.knora.org/ontology/knora-api/v2#mappingHasName")]
    pub name: String,
    #[serde(rename = "http://api.knora.org/ontology/knora-api/v2#attachedToProject")]
    pub project: String,
    #[serde(rename = "http://www.w3.org/2000/01/rdf-schema#label")]
    pub label: String,
}

/// Body of a file-value change pointing at a file already in Sipi.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileValueUpdate {
    pub file: FileReference,
}

/// Answer of Sipi's `make_thumbnail` route; other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThumbnailInfo {
    pub preview_path: String,
    pub filename: String,
    pub original_filename: String,
    pub original_mimetype: String,
}

impl From<ThumbnailInfo> for FileReference {
    fn from(info: ThumbnailInfo) -> Self {
        Self {
            original_filename: info.original_filename,
            original_mime_type: info.original_mimetype,
            filename: info.filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_values_wire_shape() {
        let resource = CreateResource::new("x#Thing", "A thing", "p")
            .with_value("x#hasInteger", PropertyValue::IntValue(12345))
            .with_value(
                "x#hasText",
                PropertyValue::RichtextValue(RichText::Xml {
                    xml: "<text/>".to_string(),
                    mapping_id: "m".to_string(),
                }),
            )
            .with_value("x#partOf", PropertyValue::LinkValue("r".to_string()));

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(
            value,
            json!({
                "restype_id": "x#Thing",
                "label": "A thing",
                "project_id": "p",
                "properties": {
                    "x#hasInteger": [{"int_value": 12345}],
                    "x#hasText": [{"richtext_value": {"xml": "<text/>", "mapping_id": "m"}}],
                    "x#partOf": [{"link_value": "r"}]
                }
            })
        );
    }

    #[test]
    fn test_resource_round_trip() {
        let resource = CreateResource::new("x#page", "test page", "p")
            .with_value("x#pagenum", PropertyValue::RichtextValue(RichText::plain("test page")))
            .with_value("x#seqnum", PropertyValue::IntValue(99999999))
            .with_file(FileReference {
                original_filename: "Chlaus.jpg".to_string(),
                original_mime_type: "image/jpeg".to_string(),
                filename: "abc.jp2".to_string(),
            });

        let text = serde_json::to_string(&resource).unwrap();
        let parsed: CreateResource = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, resource);
        assert!(text.contains("\"originalMimeType\":\"image/jpeg\""));
    }

    #[test]
    fn test_mapping_keys() {
        let mapping = CreateMapping {
            name: "TEIMapping".to_string(),
            project: "http://rdfh.ch/projects/0001".to_string(),
            label: "TEI mapping".to_string(),
        };
        let value = serde_json::to_value(&mapping).unwrap();
        assert_eq!(
            value["http://api.knora.org/ontology/knora-api/v2#mappingHasName"],
            "TEIMapping"
        );
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_thumbnail_answer_ignores_extra_fields() {
        let info: ThumbnailInfo = serde_json::from_value(json!({
            "preview_path": "http://localhost:1024/thumbs/abc.jpg",
            "filename": "abc",
            "original_filename": "Chlaus.jpg",
            "original_mimetype": "image/jpeg",
            "file_type": "IMAGE"
        }))
        .unwrap();
        let file = FileReference::from(info);
        assert_eq!(file.original_mime_type, "image/jpeg");
    }
}
