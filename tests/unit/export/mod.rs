use super::*;

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 0, 0, 64, 128],
        premultiplied: true,
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "caption-compositor-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn data_uri_round_trips_png_pixels() {
    let artifact = ExportArtifact::new(&frame(), "<b>hi</b>", "body").unwrap();
    assert!(artifact.png_data_uri.starts_with("data:image/png;base64,"));

    let png = artifact.png_bytes().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 128, 128]);
}

#[test]
fn mismatched_frame_is_an_export_error() {
    let bad = FrameRGBA {
        width: 4,
        height: 4,
        data: vec![0; 8],
        premultiplied: false,
    };
    assert!(matches!(encode_png(&bad), Err(CaptionError::Export(_))));
}

#[test]
fn non_png_data_uri_is_rejected() {
    assert!(decode_png_data_uri("data:image/jpeg;base64,AAAA").is_err());
    assert!(decode_png_data_uri("data:image/png;base64,@@@").is_err());
}

#[test]
fn save_request_uses_rpc_field_names() {
    let artifact = ExportArtifact {
        png_data_uri: "data:image/png;base64,AA==".into(),
        caption_html: "T".into(),
        body_text: "B".into(),
    };
    let json = serde_json::to_value(SaveRequest::from(&artifact)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "action": "_salvaImmagineEPostInAttesa",
            "data": {
                "immagineBase64": "data:image/png;base64,AA==",
                "titolo": "T",
                "testo": "B"
            }
        })
    );
}

#[test]
fn rpc_response_maps_data_and_error() {
    let ok: RpcResponse = serde_json::from_str(r#"{"data": "Post salvato"}"#).unwrap();
    assert_eq!(ok.into_status().unwrap(), "Post salvato");

    let err: RpcResponse = serde_json::from_str(r#"{"error": "quota"}"#).unwrap();
    assert!(matches!(err.into_status(), Err(CaptionError::Export(m)) if m == "quota"));

    let empty: RpcResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(empty.into_status().unwrap(), "");
}

#[test]
fn rpc_backend_sends_envelope_and_reads_reply() {
    let mut seen = String::new();
    let artifact = ExportArtifact::new(&frame(), "cap", "body").unwrap();
    let status = {
        let mut backend = RpcSaveBackend::new(|body: &str| {
            seen = body.to_owned();
            Ok(r#"{"data":"ok"}"#.to_owned())
        });
        backend.save(&artifact).unwrap()
    };
    assert_eq!(status, "ok");
    let sent: SaveRequest = serde_json::from_str(&seen).unwrap();
    assert_eq!(sent.action, SAVE_ACTION);
    assert_eq!(sent.data.title, "cap");
}

#[test]
fn rpc_transport_failure_is_an_export_error() {
    let artifact = ExportArtifact::new(&frame(), "cap", "body").unwrap();
    let mut backend = RpcSaveBackend::new(|_: &str| Err(anyhow::anyhow!("network down")));
    let err = backend.save(&artifact).unwrap_err();
    assert!(err.to_string().contains("network down"));
}

#[test]
fn directory_backend_writes_png_and_request() {
    let dir = temp_dir("save");
    let artifact = ExportArtifact::new(&frame(), "cap", "body").unwrap();
    let mut backend = DirectorySaveBackend::new(&dir, "post");
    let status = backend.save(&artifact).unwrap();
    assert!(status.contains("post.png"));

    let png = std::fs::read(backend.png_path()).unwrap();
    assert_eq!(png, artifact.png_bytes().unwrap());
    let req: SaveRequest =
        serde_json::from_slice(&std::fs::read(backend.request_path()).unwrap()).unwrap();
    assert_eq!(req.data.body, "body");
    let _ = std::fs::remove_dir_all(&dir);
}
