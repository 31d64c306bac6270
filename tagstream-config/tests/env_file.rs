use std::io::Write;

use tagstream_config::{ConfigLoadError, ConfigLoader};

fn env_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp env file");
    file.write_all(contents.as_bytes()).expect("write env file");
    file
}

#[test]
fn credentials_are_read_from_env_file() {
    let file = env_file(
        "TWITTER_CONSUMER_KEY=file-ck\n\
         TWITTER_CONSUMER_SECRET=file-cs\n\
         TWITTER_ACCESS_TOKEN=file-at\n\
         TWITTER_ACCESS_SECRET=file-as\n",
    );

    let load = ConfigLoader::new()
        .with_env_file(file.path())
        .with_tag("rustlang")
        .load()
        .expect("config loads");

    assert!(load.config.metadata.env_file_loaded);
    assert_eq!(load.config.tag, "rustlang");
    assert!(!load.config.feed.consumer_key.is_empty());
}

#[test]
fn missing_env_file_is_not_an_error() {
    let result = ConfigLoader::new()
        .with_env_file("/nonexistent/tagstream/.env")
        .load();

    match result {
        Ok(load) => assert!(!load.config.metadata.env_file_loaded),
        Err(ConfigLoadError::MissingCredentials { .. }) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_env_file_is_rejected() {
    let file = env_file("THIS IS NOT VALID\n");

    let err = ConfigLoader::new()
        .with_env_file(file.path())
        .load()
        .expect_err("malformed file");

    assert!(matches!(err, ConfigLoadError::EnvFile(_)));
}
