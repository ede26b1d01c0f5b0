use std::path::{Path, PathBuf};

use assert_cmd::Command as AssertCmd;
use image::{ImageFormat, RgbImage};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

/// The binary with a clean environment, so no `PORTFOLIO_*` settings leak into a test
fn portfolio() -> AssertCmd {
    let mut cmd = AssertCmd::cargo_bin("portfolio").unwrap();
    cmd.env_clear();
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, _| image::Rgb([(x % 256) as u8, 40, 200]))
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

fn add_args() -> Vec<&'static str> {
    vec![
        "add",
        "--store",
        "memory",
        "--name",
        "  Chess engine ",
        "--short-description",
        "UCI chess engine",
        "--detailed-description",
        "Bitboards and alpha-beta search",
        "--category",
        "game",
        "--tech",
        "Rust,Tokio,,Rust",
        "--feature",
        "Opening book",
        "--difficulty",
        "advanced",
    ]
}

#[test]
fn command_required() {
    let output = portfolio().assert().success().get_output().clone();
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "command required, -h/--help for help"
    );
}

#[test]
fn help_lists_commands() {
    let output = portfolio().arg("--help").assert().success().get_output().clone();
    let help = String::from_utf8_lossy(&output.stdout);
    for command in ["list", "get", "page", "add", "update", "delete", "ingest-image"] {
        assert!(help.contains(command), "{command} missing from:\n{help}");
    }
}

#[test]
fn invalid_category_is_rejected() {
    let output = portfolio()
        .args(["list", "--store", "memory", "--category", "cobol"])
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("'cobol' is not a valid category"),
        "{output:?}"
    );
}

#[test]
fn remote_store_requires_url() {
    let output = portfolio()
        .arg("list")
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("List command failed: --store=remote requires --store-url to be set"),
        "{output:?}"
    );
}

#[test]
fn list_remote_collection() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/collections/projects/documents")
        .match_query(Matcher::UrlEncoded("category".into(), "java".into()))
        .match_header("authorization", "Bearer hunter2")
        .with_status(200)
        .with_body(
            json!({"documents": [
                {
                    "id": "j1",
                    "name": "Inventory API",
                    "shortDescription": "Spring Boot service",
                    "detailedDescription": "long",
                    "category": "java",
                    "techStack": ["Java", "Spring"],
                    "createdAt": "2024-01-02T00:00:00Z",
                    "updatedAt": "2024-01-02T00:00:00Z",
                },
                {
                    "id": "j2",
                    "name": "Chat server",
                    "shortDescription": "Sockets",
                    "detailedDescription": "long",
                    "category": "java",
                    "createdAt": "2024-01-01T00:00:00Z",
                    "updatedAt": "2024-01-01T00:00:00Z",
                },
            ]})
            .to_string(),
        )
        .create();

    let output = portfolio()
        .env("PORTFOLIO_STORE_URL", server.url())
        .env("PORTFOLIO_STORE_TOKEN", "hunter2")
        .args(["list", "--category", "java", "--search", "spring"])
        .assert()
        .success()
        .get_output()
        .clone();

    let entries = stdout_json(&output);
    let ids: Vec<_> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["j1"]);
    mock.assert();
}

#[test]
fn get_missing_remote_entry_fails() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/v1/collections/projects/documents/gone")
        .with_status(404)
        .create();

    let output = portfolio()
        .args(["get", "gone", "--store-url", &server.url()])
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("Get command failed: catalog entry 'gone' not found"),
        "{output:?}"
    );
}

#[test]
fn add_prints_normalized_entry() {
    let output = portfolio()
        .args(add_args())
        .assert()
        .success()
        .get_output()
        .clone();

    let entry = stdout_json(&output);
    assert_eq!(entry["name"], "Chess engine");
    assert_eq!(entry["category"], "game");
    assert_eq!(entry["difficulty"], "advanced");
    assert_eq!(entry["techStack"], json!(["Rust", "Tokio"]));
    assert_eq!(entry["features"], json!(["Opening book"]));
    assert_eq!(entry["createdAt"], entry["updatedAt"]);
    assert!(!entry["id"].as_str().unwrap().is_empty());
}

#[test]
fn add_rejects_blank_name() {
    let mut args = add_args();
    args[4] = "   ";
    let output = portfolio()
        .args(args)
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("required field 'name'"),
        "{output:?}"
    );
}

#[test]
fn add_embeds_scaled_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "board.png", 1200, 600);

    let output = portfolio()
        .args(add_args())
        .args(["--image", path.to_str().unwrap(), "--image-max-width", "300"])
        .assert()
        .success()
        .get_output()
        .clone();

    let entry = stdout_json(&output);
    let images = entry["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert!(
        images[0]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,")
    );
}

#[test]
fn update_requires_a_field_and_an_existing_entry() {
    let output = portfolio()
        .args(["update", "p1", "--store", "memory"])
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("nothing to update"),
        "{output:?}"
    );

    let output = portfolio()
        .args(["update", "p1", "--store", "memory", "--name", "Renamed"])
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("catalog entry 'p1' not found"),
        "{output:?}"
    );
}

#[test]
fn delete_missing_entry_succeeds() {
    let output = portfolio()
        .args(["delete", "p1", "--store", "memory"])
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"Entry "p1" deleted successfully"#
    );
}

#[test]
fn page_of_empty_collection() {
    let output = portfolio()
        .args(["page", "--store", "memory", "--page-size", "6"])
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(
        stdout_json(&output),
        json!({"entries": [], "cursor": null, "hasMore": false})
    );

    portfolio()
        .args(["page", "--store", "memory", "--cursor", "not a cursor"])
        .assert()
        .failure();
    portfolio()
        .args(["page", "--store", "memory", "--page-size", "0"])
        .assert()
        .failure();
}

#[test]
fn ingest_image_prints_references() {
    let dir = tempfile::tempdir().unwrap();
    let small = write_png(dir.path(), "small.png", 40, 30);
    let large = write_png(dir.path(), "large.png", 2000, 100);

    let output = portfolio()
        .args(["ingest-image", "--image-quality", "0.5"])
        .arg(&small)
        .arg(&large)
        .assert()
        .success()
        .get_output()
        .clone();

    let ingested = stdout_json(&output);
    let ingested = ingested.as_array().unwrap();
    assert_eq!(ingested.len(), 2);
    assert_eq!(ingested[0]["path"], small.to_str().unwrap());
    for item in ingested {
        assert!(
            item["image"]
                .as_str()
                .unwrap()
                .starts_with("data:image/jpeg;base64,")
        );
    }

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "not an image").unwrap();
    let output = portfolio()
        .arg("ingest-image")
        .arg(&text)
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("failed to decode image"),
        "{output:?}"
    );
}

#[test]
fn bad_log_filter_fails_early() {
    let output = portfolio()
        .args(["list", "--store", "memory", "--log-filter", "reqwest=loud"])
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("Initializing logs failed"),
        "{output:?}"
    );
}

#[test]
fn ingest_image_raw_keeps_original_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "logo.png", 2000, 20);

    let output = portfolio()
        .args(["ingest-image", "--image-storage", "raw"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .clone();

    let ingested = stdout_json(&output);
    assert!(
        ingested[0]["image"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
}

#[test]
fn rejected_writes_upload_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "cover.png", 10, 10);

    let mut server = Server::new();
    let upload = server
        .mock("PUT", Matcher::Any)
        .with_status(200)
        .with_body(r#"{"downloadUrl": "https://cdn.example/cover.png"}"#)
        .expect(0)
        .create();
    let blob_url = server.url();
    let blob_args = [
        "--image-storage",
        "blob",
        "--blob-url",
        blob_url.as_str(),
        "--image",
        path.to_str().unwrap(),
    ];

    let output = portfolio()
        .args(["update", "p1", "--store", "memory"])
        .args(blob_args)
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("catalog entry 'p1' not found"),
        "{output:?}"
    );

    let mut args = add_args();
    args[4] = "   ";
    portfolio().args(args).args(blob_args).assert().failure();

    let output = portfolio()
        .args(["update", "p1", "--name", "Renamed"])
        .args(blob_args)
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("requires --store-url to be set"),
        "{output:?}"
    );

    upload.assert();
}
