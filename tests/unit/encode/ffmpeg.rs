use super::*;

fn job(format: OutputFormat) -> EncodeJob {
    EncodeJob {
        concat_script: PathBuf::from("/w/concat.txt"),
        audio: PathBuf::from("/a/audio.wav"),
        output: PathBuf::from("/o/lipsync.mp4"),
        format,
    }
}

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn mp4_uses_h264_yuv420p() {
    let args = strings(&encode_args(&job(OutputFormat::Mp4), false));
    let joined = args.join(" ");
    assert!(joined.starts_with("-y -loglevel error -f concat -safe 0 -i /w/concat.txt -i /a/audio.wav"));
    assert!(joined.contains("-pix_fmt yuv420p -c:v libx264 -profile:v high"));
    assert!(joined.ends_with("-c:a aac -shortest /o/lipsync.mp4"));
    assert!(!args.contains(&"-hwaccel".to_string()));
}

#[test]
fn mov_keeps_alpha_with_prores_4444() {
    let args = strings(&encode_args(&job(OutputFormat::Mov), true));
    let joined = args.join(" ");
    assert!(joined.starts_with("-hwaccel cuda -y"));
    assert!(joined.contains("-pix_fmt yuva444p10le -c:v prores_ks -profile:v 4444"));
}

#[test]
fn output_format_properties() {
    assert_eq!(OutputFormat::Mp4.extension(), "mp4");
    assert_eq!(OutputFormat::Mov.extension(), "mov");
    assert!(OutputFormat::Mov.has_alpha());
    assert!(!OutputFormat::Mp4.has_alpha());
    assert_eq!(OutputFormat::default(), OutputFormat::Mp4);
    let parsed: OutputFormat = serde_json::from_str("\"mov\"").unwrap();
    assert_eq!(parsed, OutputFormat::Mov);
}

#[test]
fn probe_duration_parsing() {
    assert_eq!(parse_probe_duration("3.250000\n").unwrap(), 3.25);
    for bad in ["", "N/A", "-1", "nan"] {
        let err = parse_probe_duration(bad).unwrap_err();
        assert!(matches!(err, LipsyncError::ExternalTool { .. }), "{bad}");
    }
}

#[test]
fn missing_binary_is_an_external_tool_error() {
    let err = run_tool(
        "definitely-not-a-tool",
        &mut Command::new("definitely-not-a-lipsync-tool-binary"),
    )
    .unwrap_err();
    match err {
        LipsyncError::ExternalTool { tool, .. } => assert_eq!(tool, "definitely-not-a-tool"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!is_tool_on_path("definitely-not-a-lipsync-tool-binary"));
}

#[cfg(unix)]
#[test]
fn non_zero_exit_surfaces_status_and_stderr() {
    let err = run_tool(
        "sh",
        Command::new("sh").args(["-c", "echo broken >&2; exit 3"]),
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("external tool 'sh' failed"), "{msg}");
    assert!(msg.contains("broken"), "{msg}");
    assert!(msg.contains('3'), "{msg}");
}
