use serde_json::json;

use tryon_studio::{
    form::{
        input::DropTarget,
        outcome::{FailureKind, SubmitOutcome, SubmitRefusal},
        session::FormPhase,
    },
    http::{
        error::TransportError,
        mock::ScriptedTransport,
        request::RequestBody,
    },
    notify::{
        status::{ErrorPayload, InlineStatus},
        toast::Severity,
    },
    page::page::Page,
    render::result::ResultCard,
    trace::logger::TraceLogger,
    workflow::catalogue::Workflow,
};

use crate::common::{done, file, png};

mod common;

// =========================================================================
// Helpers
// =========================================================================

fn page() -> Page {
    Page::full(TraceLogger::disabled())
}

fn status(page: &Page, wf: Workflow) -> InlineStatus {
    page.form(wf).unwrap().view().status().clone()
}

// =========================================================================
// Busy guard
// =========================================================================

#[test]
fn submit_while_busy_sends_nothing() {
    let mut page = page();
    page.form_mut(Workflow::TextToImage)
        .unwrap()
        .view_mut()
        .set_field("prompt", "a cat");

    let first = page.begin(Workflow::TextToImage).unwrap().unwrap();
    let form = page.form(Workflow::TextToImage).unwrap();
    assert!(form.is_busy());
    assert!(!form.view().submit_enabled());
    assert!(form.view().status().is_busy());

    let second = page.begin(Workflow::TextToImage).unwrap();
    assert_eq!(second.unwrap_err(), SubmitRefusal::Busy);
    assert_eq!(page.form(Workflow::TextToImage).unwrap().session().submissions(), 1);

    // The original submission still settles normally
    let outcome = page
        .settle(Workflow::TextToImage, first.ticket, Ok(done("ok", "/outputs/a.png")))
        .unwrap();
    assert!(outcome.is_success());
    assert!(page.form(Workflow::TextToImage).unwrap().view().submit_enabled());
}

#[test]
fn blocking_submit_while_busy_is_refused_without_request() {
    let transport = ScriptedTransport::new();
    transport.respond_json("/text2image", done("ok", "/outputs/a.png"));
    let mut page = page();

    let _pending = page.begin(Workflow::TextToImage).unwrap().unwrap();
    let outcome = page.submit(Workflow::TextToImage, &transport).unwrap();

    assert_eq!(outcome, SubmitOutcome::Refused(SubmitRefusal::Busy));
    assert_eq!(transport.count("/text2image"), 0);
}

#[test]
fn form_is_reentrant_after_settle() {
    let transport = ScriptedTransport::new();
    transport.respond_json("/text2image", done("first", "/outputs/1.png"));
    transport.respond_json("/text2image", done("second", "/outputs/2.png"));
    let mut page = page();

    assert!(page.submit(Workflow::TextToImage, &transport).unwrap().is_success());
    assert!(page.submit(Workflow::TextToImage, &transport).unwrap().is_success());

    let form = page.form(Workflow::TextToImage).unwrap();
    assert_eq!(form.session().phase(), FormPhase::Idle);
    assert_eq!(form.session().submissions(), 2);
    assert_eq!(transport.count("/text2image"), 2);
    assert_eq!(form.view().result().unwrap().current().unwrap().url(), "/outputs/2.png");
}

// =========================================================================
// Error surfacing
// =========================================================================

#[test]
fn server_rejection_shows_error_text_and_reenables_submit() {
    let transport = ScriptedTransport::new();
    transport.respond_status("/text2image", 400, r#"{"error":"bad size"}"#);
    let mut page = page();

    let outcome = page.submit(Workflow::TextToImage, &transport).unwrap();

    match outcome {
        SubmitOutcome::Failed { kind, payload } => {
            assert_eq!(kind, FailureKind::ServerRejection);
            assert_eq!(payload.summary(), "bad size");
        }
        other => panic!("Expected failure, got {:?}", other),
    }

    let form = page.form(Workflow::TextToImage).unwrap();
    assert!(form.view().submit_enabled());
    assert!(!form.is_busy());
    assert!(form.view().status().render_text().contains("bad size"));
    assert_eq!(
        form.session().last_error(),
        Some(&ErrorPayload::Json(json!({"error": "bad size"})))
    );

    let toast = page.ctx.toasts.all().last().unwrap();
    assert_eq!(toast.severity, Severity::Error);
    assert_eq!(toast.message, "bad size");
}

#[test]
fn non_json_rejection_degrades_to_raw_text() {
    let transport = ScriptedTransport::new();
    transport.respond_status("/img2img", 502, "<html><body>Bad Gateway</body></html>");
    let mut page = page();

    let outcome = page.submit(Workflow::ImageToImage, &transport).unwrap();

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed { kind: FailureKind::ServerRejection, .. }
    ));
    let status = status(&page, Workflow::ImageToImage);
    assert_eq!(
        status,
        InlineStatus::Error(ErrorPayload::Text("<html><body>Bad Gateway</body></html>".into()))
    );
    assert!(status.render_text().contains("Bad Gateway"));
    assert!(page.form(Workflow::ImageToImage).unwrap().view().submit_enabled());
}

#[test]
fn structured_error_detail_is_pretty_printed() {
    let transport = ScriptedTransport::new();
    transport.respond_status(
        "/text2image",
        502,
        r#"{"error":"ComfyUI error","detail":{"code":500,"body":"<b>x</b>"}}"#,
    );
    let mut page = page();
    page.submit(Workflow::TextToImage, &transport);

    let status = status(&page, Workflow::TextToImage);
    let text = status.render_text();
    assert!(text.starts_with("\u{2717} ComfyUI error"));
    assert!(text.contains("\"code\": 500"));

    let html = status.render_html("text2image");
    assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    assert!(!html.contains("<b>x</b>"));
}

#[test]
fn network_failure_is_a_transport_failure() {
    let transport = ScriptedTransport::new();
    transport.fail_network("/img2vid");
    let mut page = page();

    let outcome = page.submit(Workflow::ImageToVideo, &transport).unwrap();

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed { kind: FailureKind::TransportFailure, .. }
    ));
    let toast = page.ctx.toasts.all().last().unwrap();
    assert_eq!(toast.message, "Network error, please try again later");
    assert!(page.form(Workflow::ImageToVideo).unwrap().view().submit_enabled());
}

#[test]
fn unparsable_success_body_is_malformed() {
    let transport = ScriptedTransport::new();
    transport.respond_raw("/text2image", "OK");
    let mut page = page();

    let outcome = page.submit(Workflow::TextToImage, &transport).unwrap();

    match outcome {
        SubmitOutcome::Failed { kind, .. } => {
            assert_eq!(kind, FailureKind::MalformedResponse);
            assert!(kind.displays_as_transport());
        }
        other => panic!("Expected malformed failure, got {:?}", other),
    }
    assert_eq!(
        page.ctx.toasts.all().last().unwrap().message,
        "Network error, please try again later"
    );
}

#[test]
fn success_without_download_is_malformed_for_result_forms() {
    let transport = ScriptedTransport::new();
    transport.respond_json("/text2image", json!({"message": "done"}));
    let mut page = page();

    let outcome = page.submit(Workflow::TextToImage, &transport).unwrap();

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed { kind: FailureKind::MalformedResponse, .. }
    ));
    assert!(page.form(Workflow::TextToImage).unwrap().view().result().unwrap().cards().is_empty());
}

#[test]
fn error_leaves_previous_result_in_place() {
    let transport = ScriptedTransport::new();
    transport.respond_json("/text2image", done("ok", "/outputs/keep.png"));
    transport.respond_status("/text2image", 500, r#"{"error":"boom"}"#);
    let mut page = page();

    page.submit(Workflow::TextToImage, &transport);
    page.submit(Workflow::TextToImage, &transport);

    let result = page.form(Workflow::TextToImage).unwrap().view().result().unwrap();
    assert_eq!(result.cards().len(), 1);
    assert_eq!(result.current().unwrap().url(), "/outputs/keep.png");
}

// =========================================================================
// Overlapping submissions
// =========================================================================

#[test]
fn independent_forms_settle_in_any_order() {
    let mut page = page();

    let t2i = page.begin(Workflow::TextToImage).unwrap().unwrap();
    let vid = page.begin(Workflow::ImageToVideo).unwrap().unwrap();
    assert!(page.form(Workflow::TextToImage).unwrap().is_busy());
    assert!(page.form(Workflow::ImageToVideo).unwrap().is_busy());

    // Video settles first
    page.settle(Workflow::ImageToVideo, vid.ticket, Ok(done("clip", "/outputs/i2v.mp4")));
    assert!(page.form(Workflow::TextToImage).unwrap().is_busy());
    assert!(!page.form(Workflow::ImageToVideo).unwrap().is_busy());

    page.settle(
        Workflow::TextToImage,
        t2i.ticket,
        Err(TransportError::Server { status: 400, body: r#"{"error":"bad size"}"#.into() }),
    );

    let video = page.form(Workflow::ImageToVideo).unwrap();
    assert!(matches!(
        video.view().result().unwrap().current(),
        Some(ResultCard::Video { .. })
    ));
    assert_eq!(video.view().status(), &InlineStatus::Success("clip".into()));

    let image = page.form(Workflow::TextToImage).unwrap();
    assert!(image.view().status().is_error());
    assert!(image.view().result().unwrap().cards().is_empty());
}

#[test]
fn duplicate_settle_is_dropped_as_stale() {
    let mut page = page();
    let sub = page.begin(Workflow::TextToImage).unwrap().unwrap();

    let first = page
        .settle(Workflow::TextToImage, sub.ticket, Ok(done("ok", "/outputs/a.png")))
        .unwrap();
    assert!(first.is_success());

    let again = page
        .settle(
            Workflow::TextToImage,
            sub.ticket,
            Err(TransportError::Network("late".into())),
        )
        .unwrap();
    assert_eq!(again, SubmitOutcome::Stale);

    let form = page.form(Workflow::TextToImage).unwrap();
    assert_eq!(form.view().status(), &InlineStatus::Success("ok".into()));
    assert_eq!(form.view().result().unwrap().current().unwrap().url(), "/outputs/a.png");
}

// =========================================================================
// File inputs, drag-and-drop, request shape
// =========================================================================

#[test]
fn drop_and_select_share_the_same_path() {
    let picked = png("person.png", 8, 6);

    let mut by_select = page();
    let view = by_select.form_mut(Workflow::PersonUpload).unwrap().view_mut();
    assert!(view.select_files("image", vec![picked.clone()]));

    let mut by_drop = page();
    let dropped_view = by_drop.form_mut(Workflow::PersonUpload).unwrap().view_mut();
    assert!(dropped_view.drop_files(DropTarget::Form, vec![picked.clone()]));

    let a = by_select.form(Workflow::PersonUpload).unwrap().view();
    let b = by_drop.form(Workflow::PersonUpload).unwrap().view();
    assert!(a.file("image").unwrap().same_source(&picked));
    assert!(b.file("image").unwrap().same_source(&picked));
    assert_eq!(a.preview("image"), b.preview("image"));
    assert_eq!(b.preview("image").unwrap().dimensions, Some((8, 6)));
}

#[test]
fn multi_file_drop_keeps_only_the_first() {
    let mut page = page();
    let view = page.form_mut(Workflow::GarmentUpload).unwrap().view_mut();

    view.drop_files(
        DropTarget::Form,
        vec![file("shirt.png", b"one"), file("pants.png", b"two")],
    );

    assert_eq!(view.file("image").unwrap().name, "shirt.png");
    assert_eq!(view.preview("image").unwrap().source.name, "shirt.png");
}

#[test]
fn drop_outside_the_form_is_ignored() {
    let mut page = page();
    let view = page.form_mut(Workflow::ImageToImage).unwrap().view_mut();

    assert!(!view.drop_files(DropTarget::Outside, vec![file("x.png", b"x")]));
    assert!(view.file("image").is_none());
    assert!(view.preview("image").is_none());
}

#[test]
fn inpaint_drop_fills_the_image_slot_not_the_mask() {
    let mut page = page();
    let view = page.form_mut(Workflow::Inpaint).unwrap().view_mut();

    view.drop_files(DropTarget::Form, vec![file("base.png", b"base")]);

    assert_eq!(view.file("image").unwrap().name, "base.png");
    assert!(view.file("mask").is_none());
}

#[test]
fn multipart_body_carries_files_and_non_empty_fields() {
    let transport = ScriptedTransport::new();
    transport.respond_json("/inpaint", done("ok", "/outputs/in.png"));
    let mut page = page();

    let view = page.form_mut(Workflow::Inpaint).unwrap().view_mut();
    view.select_files("image", vec![file("base.png", b"base")]);
    view.select_files("mask", vec![file("mask.png", b"mask")]);
    view.set_field("prompt", "  red dress ");
    assert!(!view.set_field("width", "512"));

    page.submit(Workflow::Inpaint, &transport);

    let request = transport.last_request("/inpaint").unwrap();
    let RequestBody::Multipart(form) = request.body else {
        panic!("Expected multipart body");
    };
    assert_eq!(form.field("prompt"), Some("red dress"));
    assert_eq!(form.field("negative"), None);
    assert_eq!(form.file("image").unwrap().name, "base.png");
    assert_eq!(form.file("mask").unwrap().name, "mask.png");
}

#[test]
fn progress_indicator_tracks_upload() {
    let transport = ScriptedTransport::new();
    transport.respond_json("/img2vid", done("clip", "/outputs/i2v.mp4"));
    let mut page = page();
    page.form_mut(Workflow::ImageToVideo)
        .unwrap()
        .view_mut()
        .select_files("image", vec![file("still.png", b"0123456789")]);

    assert!(!page.form(Workflow::ImageToVideo).unwrap().view().progress().unwrap().is_visible());

    page.submit(Workflow::ImageToVideo, &transport);

    let form = page.form(Workflow::ImageToVideo).unwrap();
    assert!(form.view().progress().unwrap().is_visible());
    assert_eq!(form.progress_percent(), 100);
    assert!(page.form(Workflow::TextToImage).unwrap().view().progress().is_none());
}

#[test]
fn inline_status_can_be_set_per_form() {
    let mut page = Page::ready(&[Workflow::TextToImage], TraceLogger::disabled());

    assert!(page.set_inline_status(Workflow::TextToImage, InlineStatus::Busy("Queued".into())));
    assert!(!page.set_inline_status(Workflow::Inpaint, InlineStatus::Idle));

    let html = status(&page, Workflow::TextToImage).render_html("text2image");
    assert_eq!(html, r#"<div class="status busy" data-form="text2image">Queued</div>"#);
}
