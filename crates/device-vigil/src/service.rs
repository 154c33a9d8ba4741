use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use rule_engine::{Decision, DecisionEngine, Target};

/// One access request as sent by the host, one JSON object per line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub hardware_id: String,
    pub device_id: String,
    pub instance_id: String,
    pub process_id: u32,
}

impl AccessRequest {
    fn target(&self) -> Target {
        Target::new(&self.hardware_id, &self.device_id, &self.instance_id)
    }
}

/// Decide a single request line. Lines that do not parse are denied.
pub fn answer_line(engine: &DecisionEngine, line: &str) -> Decision {
    match serde_json::from_str::<AccessRequest>(line) {
        Ok(request) => engine.evaluate(&request.target(), request.process_id),
        Err(e) => {
            warn!(error = %e, "malformed access request; denying");
            Decision::deny()
        }
    }
}

/// Decide a raw request line. Invalid UTF-8 is denied like any other
/// malformed request.
pub fn answer_bytes(engine: &DecisionEngine, line: &[u8]) -> Decision {
    match std::str::from_utf8(line) {
        Ok(text) => answer_line(engine, text),
        Err(e) => {
            warn!(error = %e, "access request is not valid UTF-8; denying");
            Decision::deny()
        }
    }
}

/// Answer requests from `input` until EOF, writing one JSON decision per
/// line. Blank lines are skipped. Only I/O failures end the loop early.
/// Returns the number of requests answered.
pub fn serve(engine: &DecisionEngine, mut input: impl BufRead, mut output: impl Write) -> Result<usize> {
    let mut answered = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .context("failed to read access request")?;
        if read == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }
        let decision = answer_bytes(engine, line);
        serde_json::to_writer(&mut output, &decision).context("failed to encode decision")?;
        output.write_all(b"\n").context("failed to write decision")?;
        output.flush().context("failed to flush decision")?;
        answered += 1;
    }
    info!(answered, "request stream closed");
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_engine::loader::load_rules_from_str;
    use std::io::Cursor;

    fn engine() -> DecisionEngine {
        let rules = load_rules_from_str(
            r#"
rules:
  - target: { hardwareId: "pad", deviceId: "pad-0", instanceId: "0" }
    filter: "100-200"
    isAllowed: true
    isPermanent: true
"#,
        )
        .unwrap();
        DecisionEngine::new(rules)
    }

    #[test]
    fn answers_each_line_in_order() {
        let input = concat!(
            r#"{"hardwareId":"pad","deviceId":"pad-0","instanceId":"0","processId":150}"#,
            "\n\n",
            r#"{"hardwareId":"pad","deviceId":"pad-0","instanceId":"0","processId":50}"#,
            "\n",
            "not json\n",
        );
        let mut out = Vec::new();
        let answered = serve(&engine(), Cursor::new(input), &mut out).unwrap();
        assert_eq!(answered, 3);

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines[0],
            serde_json::json!({"matched": true, "isAllowed": true, "isPermanent": true, "rule": 0})
        );
        assert_eq!(lines[1]["matched"], false);
        assert_eq!(lines[2]["isAllowed"], false);
    }

    #[test]
    fn invalid_utf8_line_is_denied_and_serving_continues() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(
            br#"{"hardwareId":"pad","deviceId":"pad-0","instanceId":"0","processId":120}"#,
        );
        input.extend_from_slice(b"\r\n");

        let mut out = Vec::new();
        let answered = serve(&engine(), Cursor::new(input), &mut out).unwrap();
        assert_eq!(answered, 2);

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines[0],
            serde_json::json!({"matched": false, "isAllowed": false, "isPermanent": false})
        );
        assert_eq!(lines[1]["isAllowed"], true);
        assert_eq!(lines[1]["rule"], 0);
    }

    #[test]
    fn last_line_without_newline_is_answered() {
        let input = r#"{"hardwareId":"pad","deviceId":"pad-0","instanceId":"0","processId":200}"#;
        let mut out = Vec::new();
        assert_eq!(serve(&engine(), Cursor::new(input), &mut out).unwrap(), 1);
        assert!(String::from_utf8(out).unwrap().contains(r#""isAllowed":true"#));
    }

    #[test]
    fn negative_process_id_is_denied() {
        let line = r#"{"hardwareId":"pad","deviceId":"pad-0","instanceId":"0","processId":-150}"#;
        assert_eq!(answer_line(&engine(), line), Decision::deny());
    }

    #[test]
    fn example_rules_file_loads() {
        let rules = load_rules_from_str(include_str!("../rules.example.yaml")).unwrap();
        let engine = DecisionEngine::new(rules);
        let hw = r"HID\VID_054C&PID_09CC";
        let dev = r"HID\VID_054C&PID_09CC\7&2B5D1A3F&0&0000";

        let launcher = engine.process_access_request(hw, dev, "0000", 1500);
        assert_eq!(launcher.into_parts(), (true, true, true));

        let other = engine.process_access_request(hw, dev, "0000", 42);
        assert_eq!(other.into_parts(), (true, false, false));
    }
}
