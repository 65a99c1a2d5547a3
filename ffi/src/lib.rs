use chargen::api::{export_json, sheet_from_json, validate_json};
use chargen::{CharacterDraft, RuleTables, WizardStep};
use chrono::Utc;
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde_json::{json, Value};

const VERSION: &str = concat!("chargen-ffi ", env!("CARGO_PKG_VERSION"));

fn ok_payload(value: Value) -> String {
    json!({ "ok": true, "result": value }).to_string()
}

fn err_payload(e: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

fn to_jstring(env: &JNIEnv, payload: String) -> jstring {
    match env.new_string(payload) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn read_input(env: &mut JNIEnv, input: &JString) -> Result<String, String> {
    env.get_string(input)
        .map(Into::into)
        .map_err(|e| format!("invalid_input: {}", e))
}

fn rules() -> Result<RuleTables, String> {
    RuleTables::builtin().map_err(|e| format!("rules: {}", e))
}

// Internal functions for testing without JNI overhead

pub fn sheet_internal(draft_json: &str) -> String {
    let result = rules().and_then(|r| {
        sheet_from_json(draft_json, &r).map_err(|e| format!("invalid_draft: {:#}", e))
    });
    match result.and_then(|s| serde_json::to_value(s).map_err(|e| e.to_string())) {
        Ok(v) => ok_payload(v),
        Err(e) => err_payload(e),
    }
}

/// `step` empty means every step.
pub fn validate_internal(draft_json: &str, step: &str) -> String {
    let step = if step.trim().is_empty() {
        None
    } else {
        match WizardStep::parse(step) {
            Some(s) => Some(s),
            None => return err_payload(format!("unknown_step: {}", step)),
        }
    };
    let result = rules().and_then(|r| {
        validate_json(draft_json, &r, step).map_err(|e| format!("invalid_draft: {:#}", e))
    });
    match result.and_then(|errs| serde_json::to_value(errs).map_err(|e| e.to_string())) {
        Ok(v) => ok_payload(v),
        Err(e) => err_payload(e),
    }
}

pub fn export_internal(draft_json: &str) -> String {
    let draft = match CharacterDraft::from_json(draft_json) {
        Ok(d) => d,
        Err(e) => return err_payload(format!("invalid_draft: {}", e)),
    };
    let doc = rules().and_then(|r| {
        export_json(&draft, &r, Utc::now()).map_err(|e| format!("{:#}", e))
    });
    match doc.and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string())) {
        Ok(v) => ok_payload(v),
        Err(e) => err_payload(e),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_chargen_Ffi_version(env: JNIEnv, _class: JClass) -> jstring {
    to_jstring(&env, VERSION.to_string())
}

#[no_mangle]
pub extern "system" fn Java_com_chargen_Ffi_sheetJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let payload = match read_input(&mut env, &json) {
        Ok(input) => sheet_internal(&input),
        Err(e) => err_payload(e),
    };
    to_jstring(&env, payload)
}

#[no_mangle]
pub extern "system" fn Java_com_chargen_Ffi_validateJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
    step: JString,
) -> jstring {
    let payload = match (read_input(&mut env, &json), read_input(&mut env, &step)) {
        (Ok(input), Ok(step)) => validate_internal(&input, &step),
        (Err(e), _) | (_, Err(e)) => err_payload(e),
    };
    to_jstring(&env, payload)
}

#[no_mangle]
pub extern "system" fn Java_com_chargen_Ffi_exportJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let payload = match read_input(&mut env, &json) {
        Ok(input) => export_internal(&input),
        Err(e) => err_payload(e),
    };
    to_jstring(&env, payload)
}
