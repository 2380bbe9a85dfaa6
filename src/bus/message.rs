// SPDX-License-Identifier: MPL-2.0

use gst::glib;
use gst::glib::translate::IntoGlib;
use gst::prelude::*;

use std::ffi::CStr;

/// Originating-element path and message text of an error-typed [`BusEvent`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ErrorDetail {
    /// Path of the reporting element within the pipeline hierarchy.
    pub path: String,
    /// The engine's error message.
    pub message: String,
}

/// One bus message, marshaled into a caller-facing form.
///
/// Every structure field of the underlying message is copied into `payload`
/// in the order the engine produced them; nested structures become nested
/// mappings, arrays and lists become ordered sequences, and field types with
/// no native mapping are coerced to their string representation rather than
/// dropped. `error` is populated only for error-typed messages.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BusEvent {
    /// The engine's name for the message type, e.g. `"eos"` or `"error"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Name of the element that produced the message.
    pub source: String,
    /// The message's structure fields, in production order.
    pub payload: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl BusEvent {
    pub fn from_message(msg: &gst::Message) -> Self {
        let kind = message_type_name(msg.type_()).to_string();
        let source = msg
            .src()
            .map(|src| src.name().to_string())
            .unwrap_or_default();

        let payload = msg.structure().map(marshal_structure).unwrap_or_default();

        let error = match msg.view() {
            gst::MessageView::Error(err) => Some(ErrorDetail {
                path: err
                    .src()
                    .map(|src| src.path_string().to_string())
                    .unwrap_or_default(),
                message: err.error().message().to_string(),
            }),
            _ => None,
        };

        BusEvent {
            kind,
            source,
            payload,
            error,
        }
    }
}

fn message_type_name(type_: gst::MessageType) -> &'static str {
    // SAFETY: the engine returns a static string for every message type.
    unsafe {
        CStr::from_ptr(gst::ffi::gst_message_type_get_name(type_.into_glib()))
            .to_str()
            .unwrap_or("unknown")
    }
}

fn marshal_structure(s: &gst::StructureRef) -> serde_json::Map<String, serde_json::Value> {
    s.iter()
        .map(|(name, value)| (name.to_string(), marshal_value(value)))
        .collect()
}

fn marshal_value(val: &glib::Value) -> serde_json::Value {
    match val.type_() {
        glib::Type::STRING => val.get::<Option<String>>().unwrap().into(),
        glib::Type::BOOL => val.get::<bool>().unwrap().into(),
        glib::Type::I32 => val.get::<i32>().unwrap().into(),
        glib::Type::U32 => val.get::<u32>().unwrap().into(),
        glib::Type::I_LONG | glib::Type::I64 => val.get::<i64>().unwrap().into(),
        glib::Type::U_LONG | glib::Type::U64 => val.get::<u64>().unwrap().into(),
        glib::Type::F32 => val.get::<f32>().unwrap().into(),
        glib::Type::F64 => val.get::<f64>().unwrap().into(),
        _ => {
            if let Ok(s) = val.get::<gst::Structure>() {
                serde_json::Value::Object(marshal_structure(&s))
            } else if let Ok(array) = val.get::<gst::Array>() {
                array.iter().map(|v| marshal_value(v)).collect::<Vec<_>>().into()
            } else if let Ok(list) = val.get::<gst::List>() {
                list.iter().map(|v| marshal_value(v)).collect::<Vec<_>>().into()
            } else if let Some((_klass, values)) = glib::FlagsValue::from_value(val) {
                values
                    .iter()
                    .map(|value| value.nick())
                    .collect::<Vec<&str>>()
                    .join("+")
                    .into()
            } else if let Ok(serialized) = val.serialize() {
                serialized.as_str().into()
            } else {
                format!("{val:?}").into()
            }
        }
    }
}
