use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .env_remove("GRADEBOOKD_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn send(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = send(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = send(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value.get("error").cloned().expect("error object")
}

fn entry(student_id: i64, subject_id: i64, ltc: f64) -> serde_json::Value {
    json!({
        "studentId": student_id,
        "subjectId": subject_id,
        "classId": 3,
        "academicYear": "2024/2025",
        "term": "SECOND",
        "ltc": ltc,
    })
}

#[test]
fn assemble_from_supplied_results() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let mut results = Vec::new();
    for (i, (subject, score)) in [(1, 80.0), (2, 60.0), (3, 70.0)].into_iter().enumerate() {
        let computed = request_ok(
            &mut stdin,
            &mut reader,
            &format!("c{}", i),
            "scores.compute",
            json!({ "record": entry(7, subject, score) }),
        );
        results.push(computed["result"].clone());
    }

    let card = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reportCard.assemble",
        json!({
            "studentId": 7,
            "academicYear": "2024/2025",
            "term": "SECOND",
            "results": results,
        }),
    );
    assert_eq!(card["numberOfSubjects"], 3);
    assert_eq!(card["marksObtainable"], 300);
    assert_eq!(card["totalMarksObtained"].as_f64(), Some(210.0));
    assert_eq!(card["average"].as_f64(), Some(70.0));
    assert_eq!(card["hasResults"], true);

    let empty = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reportCard.assemble",
        json!({
            "studentId": 7,
            "academicYear": "2024/2025",
            "term": "THIRD",
            "results": [],
        }),
    );
    assert_eq!(empty["numberOfSubjects"], 0);
    assert_eq!(empty["average"].as_f64(), Some(0.0));
    assert_eq!(empty["hasResults"], false);

    let e = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "reportCard.assemble",
        json!({
            "studentId": 7,
            "academicYear": "2024/2025",
            "term": "SECOND",
            "results": [{ "studentId": "x" }],
        }),
    );
    assert_eq!(e["code"], "bad_params");
    assert_eq!(e["details"]["index"], 0);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn report_cards_from_the_score_book() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "roster.set",
        json!({ "classId": 3, "studentIds": [1, 2, 3] }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "scores.bulkUpsert",
        json!({ "records": [
            entry(1, 10, 80.0),
            entry(1, 11, 60.0),
            entry(2, 10, 90.0),
            entry(2, 11, 70.0),
        ] }),
    );

    let card = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "reportCard.get",
        json!({ "studentId": 1, "academicYear": "2024-2025", "term": "second" }),
    );
    assert_eq!(card["numberOfSubjects"], 2);
    assert_eq!(card["average"].as_f64(), Some(70.0));
    assert_eq!(card["results"][0]["subjectPosition"], 2);
    assert_eq!(card["results"][0]["classAverage"].as_f64(), Some(85.0));

    let class = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "reportCard.class",
        json!({ "classId": 3, "academicYear": "2024/2025", "term": "SECOND" }),
    );
    let cards = class["reportCards"].as_array().expect("cards");
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0]["classPosition"], 2);
    assert_eq!(cards[1]["classPosition"], 1);
    assert_eq!(cards[1]["average"].as_f64(), Some(80.0));
    assert_eq!(cards[2]["hasResults"], false);
    assert!(cards[2]["classPosition"].is_null());
    assert_eq!(cards[2]["numberOfSubjects"], 0);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn assemble_rejects_a_repeated_subject_and_reads_any_term_case() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let computed = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "scores.compute",
        json!({ "record": entry(4, 10, 55.0) }),
    );
    let mut result = computed["result"].clone();
    result["term"] = json!("sEcOnD");

    let card = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reportCard.assemble",
        json!({
            "studentId": 4,
            "academicYear": "2024/2025",
            "term": "SECOND",
            "results": [result.clone()],
        }),
    );
    assert_eq!(card["numberOfSubjects"], 1);
    assert_eq!(card["results"][0]["term"], "SECOND");

    let e = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "reportCard.assemble",
        json!({
            "studentId": 4,
            "academicYear": "2024/2025",
            "term": "SECOND",
            "results": [result.clone(), result],
        }),
    );
    assert_eq!(e["code"], "validation_failed");
    assert_eq!(e["details"]["index"], 1);
    assert_eq!(e["details"]["reason"], "duplicate");

    drop(stdin);
    let _ = child.wait();
}
