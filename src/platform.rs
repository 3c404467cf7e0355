//! Descriptive platform facts for the FULL report.
use serde_json::Value;
use std::collections::BTreeMap;

/// Run the fixed query table: each entry is invoked and kept only when it
/// yields a value, then entries that are empty (or sequences made up entirely
/// of empty strings) are dropped as carrying no information on this host.
pub fn platform_facts() -> BTreeMap<String, Value> {
    let queries: &[(&str, fn() -> Option<Value>)] = &[
        ("system", || uname_field(UnameField::System)),
        ("node", || uname_field(UnameField::Node)),
        ("release", || uname_field(UnameField::Release)),
        ("version", || uname_field(UnameField::Version)),
        ("machine", || uname_field(UnameField::Machine)),
        ("os", || Some(Value::from(std::env::consts::OS))),
        ("arch", || Some(Value::from(std::env::consts::ARCH))),
        ("family", || Some(Value::from(std::env::consts::FAMILY))),
        ("uname", uname_sequence),
    ];

    let mut facts = BTreeMap::new();
    for (name, query) in queries {
        let Some(value) = query() else { continue };
        if is_all_empty(&value) {
            continue;
        }
        facts.insert((*name).to_string(), value);
    }
    facts
}

fn is_all_empty(value: &Value) -> bool {
    match value {
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.iter().all(is_all_empty),
        _ => false,
    }
}

#[derive(Clone, Copy)]
enum UnameField {
    System,
    Node,
    Release,
    Version,
    Machine,
}

#[cfg(unix)]
fn uname_field(field: UnameField) -> Option<Value> {
    let info = uname()?;
    let text = match field {
        UnameField::System => info.sysname,
        UnameField::Node => info.nodename,
        UnameField::Release => info.release,
        UnameField::Version => info.version,
        UnameField::Machine => info.machine,
    };
    Some(Value::from(text))
}

#[cfg(unix)]
fn uname_sequence() -> Option<Value> {
    let info = uname()?;
    Some(Value::Array(vec![
        Value::from(info.sysname),
        Value::from(info.nodename),
        Value::from(info.release),
        Value::from(info.version),
        Value::from(info.machine),
    ]))
}

#[cfg(unix)]
struct Uname {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
}

#[cfg(unix)]
fn uname() -> Option<Uname> {
    let mut raw = std::mem::MaybeUninit::<libc::utsname>::zeroed();
    // SAFETY: uname(2) fills the buffer we own; on non-zero return the
    // contents are not read.
    let rc = unsafe { libc::uname(raw.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    let raw = unsafe { raw.assume_init() };
    Some(Uname {
        sysname: c_chars_to_string(&raw.sysname),
        nodename: c_chars_to_string(&raw.nodename),
        release: c_chars_to_string(&raw.release),
        version: c_chars_to_string(&raw.version),
        machine: c_chars_to_string(&raw.machine),
    })
}

#[cfg(unix)]
fn c_chars_to_string(field: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = field
        .iter()
        .take_while(|&&byte| byte != 0)
        .map(|&byte| byte as u8)
        .collect();
    String::from_utf8_lossy(&bytes).to_string()
}

#[cfg(not(unix))]
fn uname_field(_field: UnameField) -> Option<Value> {
    None
}

#[cfg(not(unix))]
fn uname_sequence() -> Option<Value> {
    None
}
