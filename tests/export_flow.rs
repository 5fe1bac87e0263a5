#![cfg(feature = "render")]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sigblock::assets::{encode_png, AssetLoader, DecodedImage, ImageLoader, StaticLoader};
use sigblock::avatar::Avatar;
use sigblock::dom::Element;
use sigblock::export::{
    DirectorySink, DownloadSink, Exporter, MemorySink, PreviewDocument, RenderSurface,
    SurfaceHandle,
};
use sigblock::fields::Field;
use sigblock::preview::SignaturePreview;
use sigblock::settle::{SettleHandle, SettleSignal};
use sigblock::state::{Action, ButtonState, FormState};
use sigblock::{Error, ExportConfig, Result};

/// Counts attach/detach calls on top of a real preview document.
struct CountingSurface {
    inner: PreviewDocument,
    attaches: usize,
    detaches: usize,
}

impl CountingSurface {
    fn new(inner: PreviewDocument) -> Self {
        Self { inner, attaches: 0, detaches: 0 }
    }
}

impl RenderSurface for CountingSurface {
    fn find(&self, id: &str) -> Option<&Element> {
        self.inner.find(id)
    }

    fn attach(&mut self, node: Element) -> SurfaceHandle {
        self.attaches += 1;
        self.inner.attach(node)
    }

    fn detach(&mut self, handle: SurfaceHandle) -> Result<Element> {
        self.detaches += 1;
        self.inner.detach(handle)
    }
}

struct FailingSink;

impl DownloadSink for FailingSink {
    fn save(&mut self, _file_name: &str, _png: &[u8]) -> Result<PathBuf> {
        Err(Error::ExportError("disk full".into()))
    }
}

/// Starts every load and never settles it.
#[derive(Default)]
struct StalledLoader {
    pending: Mutex<Vec<SettleHandle<Arc<DecodedImage>>>>,
}

impl ImageLoader for StalledLoader {
    fn load(&self, _src: &str) -> SettleSignal<Arc<DecodedImage>> {
        let (handle, signal) = SettleSignal::channel();
        self.pending.lock().unwrap().push(handle);
        signal
    }
}

fn filled_state() -> FormState {
    FormState::default()
        .apply(Action::SetField(Field::Name, "maria da silva santos".into()))
        .apply(Action::SetField(Field::Role, "analista de sistemas".into()))
        .apply(Action::SetField(Field::Department, "SMCTIC".into()))
        .apply(Action::SetField(Field::Phone, "21988887777".into()))
        .apply(Action::SetField(Field::Address, "Rua General Bocaiúva, 636".into()))
}

fn surface_for(state: &FormState, config: &ExportConfig) -> CountingSurface {
    let preview = SignaturePreview::new(state, config);
    CountingSurface::new(PreviewDocument::from_preview(&preview).expect("preview parses"))
}

fn decode(png_bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let decoder = png::Decoder::new(png_bytes);
    let mut reader = decoder.read_info().expect("decode");
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).expect("frame");
    buf.truncate(info.buffer_size());
    (info.width, info.height, buf)
}

#[tokio::test]
async fn export_produces_png_and_cleans_up_once() {
    let config = ExportConfig::default();
    let state = filled_state();
    let mut surface = surface_for(&state, &config);
    let mut sink = MemorySink::default();
    let exporter = Exporter::new(&config, StaticLoader::default());

    let (state, result) = exporter.download(state, &mut surface, &mut sink).await;
    let report = result.expect("export succeeds");

    assert_eq!(state.button(), ButtonState::Success);
    assert_eq!(state.button().label(), "Assinatura baixada!");
    assert_eq!(surface.attaches, 1);
    assert_eq!(surface.detaches, 1);
    assert_eq!(surface.inner.attached(), 0);

    assert_eq!(sink.files.len(), 1);
    let (name, bytes) = &sink.files[0];
    assert_eq!(name, "assinatura-email.png");
    assert_eq!(report.path, PathBuf::from("assinatura-email.png"));

    let (w, h, rgba) = decode(bytes);
    assert_eq!(w, 700);
    assert_eq!(h, report.height);
    assert!(h > 100, "height {} should follow the content", h);

    let white = rgba.chunks(4).any(|p| p == [255, 255, 255, 255]);
    let dark = rgba.chunks(4).any(|p| p[0] < 128 && p[1] < 128 && p[2] < 160 && p[3] == 255);
    assert!(white, "expected white background pixels");
    assert!(dark, "expected rendered text pixels");
}

#[tokio::test]
async fn incomplete_form_is_refused_without_output() {
    let config = ExportConfig::default();
    let state = filled_state().apply(Action::SetField(Field::Phone, String::new()));
    let mut surface = surface_for(&state, &config);
    let mut sink = MemorySink::default();
    let exporter = Exporter::new(&config, StaticLoader::default());

    let (state, result) = exporter.download(state, &mut surface, &mut sink).await;
    match result {
        Err(Error::IncompleteFields(missing)) => assert_eq!(missing, vec![Field::Phone]),
        other => panic!("expected refusal, got {:?}", other.map(|r| r.path)),
    }
    assert_eq!(state.button(), ButtonState::Idle);
    assert!(sink.files.is_empty());
    assert_eq!(surface.attaches, 0);
    assert_eq!(surface.detaches, 0);
}

#[tokio::test]
async fn export_checks_fields_even_when_called_directly() {
    let config = ExportConfig::default();
    let state = FormState::default();
    let mut surface = surface_for(&state, &config);
    let mut sink = MemorySink::default();
    let exporter = Exporter::new(&config, StaticLoader::default());

    let err = exporter.export(&state, &mut surface, &mut sink).await.unwrap_err();
    assert!(err.is_user_alert());
    assert_eq!(surface.attaches, 0);
}

#[tokio::test]
async fn failed_save_still_detaches_once() {
    let config = ExportConfig::default();
    let state = filled_state();
    let mut surface = surface_for(&state, &config);
    let exporter = Exporter::new(&config, StaticLoader::default());

    let (state, result) = exporter.download(state, &mut surface, &mut FailingSink).await;
    assert!(matches!(result, Err(Error::ExportError(_))));
    assert_eq!(state.button(), ButtonState::Failed);
    assert_eq!(state.button().label(), "Erro ao gerar assinatura");
    assert_eq!(surface.attaches, 1);
    assert_eq!(surface.detaches, 1);
    assert_eq!(surface.inner.attached(), 0);
}

#[tokio::test]
async fn broken_images_do_not_block_export() {
    let dir = std::env::temp_dir().join(format!("sigblock-export-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let photo = encode_png(2, 2, &[200u8, 30, 30, 255].repeat(4)).unwrap();
    let avatar = Avatar::from_bytes("image/png", &photo).unwrap();
    assert!(avatar.data_url().ends_with(&STANDARD.encode(&photo)));

    let config = ExportConfig {
        logo_path: Some(dir.join("missing-logo.png")),
        ..Default::default()
    };
    let state = filled_state().apply(Action::SetAvatar(avatar));
    let mut surface = surface_for(&state, &config);
    let mut sink = DirectorySink::new(&dir);
    let exporter = Exporter::new(&config, AssetLoader::default());

    let report = exporter
        .export(&state, &mut surface, &mut sink)
        .await
        .expect("export succeeds with a broken logo");
    assert_eq!(report.images_loaded, 1);
    assert_eq!(report.images_failed, 1);
    assert_eq!(surface.detaches, 1);

    let written = std::fs::read(dir.join("assinatura-email.png")).unwrap();
    let (w, _, rgba) = decode(&written);
    assert_eq!(w, 700);
    assert!(rgba.chunks(4).any(|p| p == [200, 30, 30, 255]), "avatar pixels present");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn revert_to_idle_after_delay() {
    let config = ExportConfig { revert_delay_ms: 50, ..Default::default() };
    let state = FormState::with_fields(filled_state().fields().clone(), config.revert_delay());
    let mut surface = surface_for(&state, &config);
    let exporter = Exporter::new(&config, StaticLoader::default());

    let (state, result) = exporter
        .download(state, &mut surface, &mut MemorySink::default())
        .await;
    assert!(result.is_ok());
    assert_eq!(state.button(), ButtonState::Success);

    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    let state = state.apply(Action::Tick(std::time::Instant::now()));
    assert_eq!(state.button(), ButtonState::Idle);
    assert!(state.can_download());
}

#[tokio::test]
async fn jpeg_avatar_is_rendered() {
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 100)
        .encode(&[30u8, 160, 60].repeat(16 * 16), 16, 16, image::ColorType::Rgb8)
        .unwrap();
    let avatar = Avatar::from_bytes("image/jpeg", &jpeg).unwrap();

    let config = ExportConfig::default();
    let state = filled_state().apply(Action::SetAvatar(avatar));
    let mut surface = surface_for(&state, &config);
    let mut sink = MemorySink::default();
    let exporter = Exporter::new(&config, AssetLoader::default());

    let report = exporter
        .export(&state, &mut surface, &mut sink)
        .await
        .expect("export succeeds with a jpeg avatar");
    assert_eq!(report.images_loaded, 1);
    assert_eq!(report.images_failed, 0);

    let (_, _, rgba) = decode(&sink.files[0].1);
    let green = rgba.chunks(4).any(|p| {
        p[0].abs_diff(30) < 12 && p[1].abs_diff(160) < 12 && p[2].abs_diff(60) < 12 && p[3] == 255
    });
    assert!(green, "jpeg avatar pixels present");
}

#[tokio::test]
async fn dropped_export_still_detaches_clone() {
    let photo = encode_png(1, 1, &[1, 2, 3, 255]).unwrap();
    let avatar = Avatar::from_bytes("image/png", &photo).unwrap();
    let config = ExportConfig::default();
    let state = filled_state().apply(Action::SetAvatar(avatar));
    let mut surface = surface_for(&state, &config);
    let mut sink = MemorySink::default();
    let exporter = Exporter::new(&config, StalledLoader::default());

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        exporter.export(&state, &mut surface, &mut sink),
    )
    .await;
    assert!(outcome.is_err(), "export should still be waiting on the image");

    assert_eq!(surface.attaches, 1);
    assert_eq!(surface.detaches, 1);
    assert_eq!(surface.inner.attached(), 0);
    assert!(sink.files.is_empty());
}
