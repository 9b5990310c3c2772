use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_mentions_subcommands() {
    Command::cargo_bin("yt2md")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("model"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("yt2md")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("yt2md"));
}

#[test]
fn fetch_rejects_unsupported_urls() {
    Command::cargo_bin("yt2md")
        .unwrap()
        .args(["--quiet", "fetch", "https://vimeo.com/12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported URL format"));
}

#[test]
fn fetch_requires_a_url() {
    Command::cargo_bin("yt2md")
        .unwrap()
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL"));
}

#[test]
fn model_download_skips_installed_models() {
    let home = tempfile::tempdir().unwrap();
    let models_dir = home.path().join("data").join("yt2md").join("models");
    std::fs::create_dir_all(&models_dir).unwrap();
    std::fs::write(models_dir.join("ggml-tiny.bin"), b"stub model").unwrap();

    Command::cargo_bin("yt2md")
        .unwrap()
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .args(["model", "--download", "tiny"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));
}

#[test]
fn model_list_shows_known_models() {
    Command::cargo_bin("yt2md")
        .unwrap()
        .args(["model", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base"))
        .stdout(predicate::str::contains("large-v3"));
}
