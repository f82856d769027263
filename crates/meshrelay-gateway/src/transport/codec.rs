//! JSON frames the gateway writes on its own behalf (not decoded events).

use serde_json::json;

pub fn sys_error_json(code: &str, msg: &str) -> String {
    json!({
        "kind": "sys",
        "type": "error",
        "code": code,
        "msg": msg,
    })
    .to_string()
}

pub fn sys_lagged_json(skipped: u64) -> String {
    json!({
        "kind": "sys",
        "type": "lagged",
        "skipped": skipped,
    })
    .to_string()
}

pub fn dropped_json(reason: &str) -> String {
    json!({
        "dropped": true,
        "reason": reason,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn frames_are_valid_json() {
        let v: serde_json::Value = serde_json::from_str(&sys_error_json("TIMEOUT", "idle \"x\"")).unwrap();
        assert_eq!(v["msg"], "idle \"x\"");
        let v: serde_json::Value = serde_json::from_str(&sys_lagged_json(7)).unwrap();
        assert_eq!(v["skipped"], 7);
        let v: serde_json::Value = serde_json::from_str(&dropped_json("topic_filtered")).unwrap();
        assert_eq!(v["reason"], "topic_filtered");
    }
}
