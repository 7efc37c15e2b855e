use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "lipsync_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn whisper_args_respect_model_and_cpu_flag() {
    let mut whisper = WhisperCli {
        model: WhisperModel::Small,
        ..WhisperCli::default()
    };
    let args = whisper
        .args(Path::new("/a/audio.wav"), Path::new("/w/transcript"))
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(
        args,
        [
            "/a/audio.wav",
            "--model",
            "small",
            "--output_format",
            "txt",
            "--output_dir",
            "/w/transcript"
        ]
    );

    whisper.force_cpu = true;
    let args = whisper.args(Path::new("a.wav"), Path::new("out"));
    assert!(args.iter().any(|a| a == "cpu"));
}

#[test]
fn whisper_model_defaults_to_large() {
    assert_eq!(WhisperModel::default().as_str(), "large");
    let parsed: WhisperModel = serde_json::from_str("\"tiny\"").unwrap();
    assert_eq!(parsed, WhisperModel::Tiny);
}

#[test]
fn existing_transcript_file_is_passed_through() {
    let tmp = temp_dir("transcript_file");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("transcript.txt");
    std::fs::write(&path, "hello world").unwrap();

    let got = TranscriptFile(path.clone())
        .transcribe(Path::new("audio.wav"), &tmp)
        .unwrap();
    assert_eq!(got, path);

    let err = TranscriptFile(tmp.join("missing.txt"))
        .transcribe(Path::new("audio.wav"), &tmp)
        .unwrap_err();
    assert!(matches!(err, LipsyncError::Configuration(_)));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn rhubarb_path_that_does_not_exist_is_a_configuration_error() {
    let tmp = temp_dir("rhubarb_missing");
    let err = Rhubarb::new(tmp.join("rhubarb"))
        .align(
            Path::new("audio.wav"),
            Path::new("t.txt"),
            &tmp.join("sync.tsv"),
        )
        .unwrap_err();
    assert!(matches!(err, LipsyncError::Configuration(_)));
}

#[cfg(unix)]
#[test]
fn rhubarb_output_table_is_read_back() {
    use std::os::unix::fs::PermissionsExt as _;

    let tmp = temp_dir("rhubarb_fake");
    std::fs::create_dir_all(&tmp).unwrap();
    // Fake aligner: `-f tsv -o <out> -d <transcript> <audio>`
    let exe = tmp.join("rhubarb");
    std::fs::write(&exe, "#!/bin/sh\nprintf '0.50\\tA\\n1.00\\tX\\n' > \"$4\"\n").unwrap();
    std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

    let out = tmp.join("sync.tsv");
    let tsv = Rhubarb::new(&exe)
        .align(Path::new("audio.wav"), Path::new("t.txt"), &out)
        .unwrap();
    assert_eq!(tsv, "0.50\tA\n1.00\tX\n");

    std::fs::remove_dir_all(&tmp).ok();
}
