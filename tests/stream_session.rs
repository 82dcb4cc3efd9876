use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use luxcast::{
    BridgeDescriptor, Colour, ColourTarget, ConnectionError, FakeBridgeConfig,
    FakeBridgeController, SelectOutcome, SessionError, SessionState, StartOutcome, StateError,
    StreamSession,
};

fn accepted_descriptor() -> BridgeDescriptor {
    BridgeDescriptor::new("bridge-1", "10.0.0.2", "stream-user", "clientkey")
}

fn fake_config() -> FakeBridgeConfig {
    FakeBridgeConfig::builder()
        .bridge(accepted_descriptor())
        .groups(
            "200:1,2,3;201:7,8"
                .parse()
                .expect("group fixture should parse"),
        )
        .build()
}

fn session() -> StreamSession {
    StreamSession::new(Box::new(FakeBridgeController::new(fake_config())))
}

fn manual_start_session() -> StreamSession {
    let config = FakeBridgeConfig::builder()
        .bridge(accepted_descriptor())
        .groups("200:1,2,3".parse().expect("group fixture should parse"))
        .auto_start(false)
        .build();
    StreamSession::new(Box::new(FakeBridgeController::new(config)))
}

async fn streaming_session() -> StreamSession {
    let session = session();
    session
        .initialize("app", "device")
        .expect("initialise should succeed");
    let result = session
        .connect(accepted_descriptor())
        .await
        .expect("connect should succeed");
    assert!(result.is_connected());
    let outcome = session
        .select_group(Some("200"))
        .await
        .expect("group selection should succeed");
    assert_eq!(SelectOutcome::Streaming, outcome);
    let started = session.start().await.expect("start should succeed");
    assert_eq!(StartOutcome::Streaming, started);
    session
}

#[tokio::test]
async fn initialize_rejects_empty_identifiers() {
    let session = session();
    let result = session.initialize("", "device");
    assert_matches!(result, Err(SessionError::Config(_)));
    assert_eq!(SessionState::Uninitialized, session.state());
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let session = session();
    session
        .initialize("app", "device")
        .expect("first initialise should succeed");
    session
        .initialize("app", "device")
        .expect("second initialise should be a no-op success");
    assert!(session.status().initialized());
}

#[tokio::test]
async fn connect_before_initialize_is_a_state_error() {
    let session = session();
    let result = session.connect(accepted_descriptor()).await;
    assert_matches!(
        result,
        Err(SessionError::State(StateError::NotInitialized))
    );
}

#[tokio::test]
async fn select_group_before_connect_is_a_state_error() {
    let session = session();
    session
        .initialize("app", "device")
        .expect("initialise should succeed");
    let result = session.select_group(Some("200")).await;
    assert_matches!(result, Err(SessionError::State(StateError::NotConnected)));
}

#[tokio::test]
async fn connect_with_bad_credentials_is_a_connection_error() {
    let session = session();
    session
        .initialize("app", "device")
        .expect("initialise should succeed");

    let descriptor = BridgeDescriptor::new("bridge-1", "10.0.0.2", "stream-user", "wrong-key");
    let result = session.connect(descriptor).await;

    assert_matches!(
        result,
        Err(SessionError::Connection(ConnectionError::InvalidCredentials { bridge_id }))
            if bridge_id == "bridge-1"
    );
    assert!(!session.status().connected());
}

#[tokio::test]
async fn connect_to_unknown_address_is_unreachable() {
    let session = session();
    session
        .initialize("app", "device")
        .expect("initialise should succeed");

    let descriptor = BridgeDescriptor::new("bridge-1", "10.9.9.9", "stream-user", "clientkey");
    let result = session.connect(descriptor).await;

    assert_matches!(
        result,
        Err(SessionError::Connection(ConnectionError::Unreachable { address }))
            if address == "10.9.9.9"
    );
}

#[tokio::test]
async fn slow_handshake_times_out() {
    let config = FakeBridgeConfig::builder()
        .bridge(accepted_descriptor())
        .groups("200:1".parse().expect("group fixture should parse"))
        .connect_delay(Duration::from_millis(50))
        .build();
    let session = StreamSession::new(Box::new(FakeBridgeController::new(config)));
    session
        .initialize("app", "device")
        .expect("initialise should succeed");

    let result = session
        .connect_with_timeout(accepted_descriptor(), Duration::from_millis(10))
        .await;

    assert_matches!(
        result,
        Err(SessionError::Connection(ConnectionError::HandshakeTimeout { .. }))
    );
    assert!(!session.status().connected());
}

#[tokio::test]
async fn second_connect_is_rejected_while_connected() {
    let session = streaming_session().await;
    let result = session.connect(accepted_descriptor()).await;
    assert_matches!(
        result,
        Err(SessionError::State(StateError::AlreadyConnected { bridge_id }))
            if bridge_id == "bridge-1"
    );
}

#[tokio::test]
async fn auto_start_selection_reports_streaming_state() {
    let session = session();
    session
        .initialize("app", "device")
        .expect("initialise should succeed");
    session
        .connect(accepted_descriptor())
        .await
        .expect("connect should succeed");

    let outcome = session
        .select_group(None)
        .await
        .expect("default group selection should succeed");

    assert_eq!(SelectOutcome::Streaming, outcome);
    assert_eq!(SessionState::Streaming, session.state());
    assert_eq!(Some("200"), session.status().selected_group());
}

#[tokio::test]
async fn colour_call_before_start_is_a_state_error() {
    let session = session();
    session
        .initialize("app", "device")
        .expect("initialise should succeed");
    session
        .connect(accepted_descriptor())
        .await
        .expect("connect should succeed");
    session
        .select_group(Some("200"))
        .await
        .expect("group selection should succeed");

    let result = session.set_colour(&ColourTarget::Group, Colour::from_rgb8(255, 0, 0));
    assert_matches!(result, Err(SessionError::State(StateError::NotStreaming)));
}

#[tokio::test]
async fn unknown_group_is_rejected() {
    let session = session();
    session
        .initialize("app", "device")
        .expect("initialise should succeed");
    session
        .connect(accepted_descriptor())
        .await
        .expect("connect should succeed");

    let result = session.select_group(Some("999")).await;
    assert_matches!(
        result,
        Err(SessionError::Connection(ConnectionError::GroupRejected { group_id }))
            if group_id == "999"
    );
}

#[tokio::test]
async fn start_before_bridge_streams_reports_not_ready() {
    let session = manual_start_session();
    session
        .initialize("app", "device")
        .expect("initialise should succeed");
    session
        .connect(accepted_descriptor())
        .await
        .expect("connect should succeed");

    let outcome = session
        .select_group(Some("200"))
        .await
        .expect("group selection should succeed");
    assert_eq!(SelectOutcome::GroupSelected, outcome);
    assert_eq!(SessionState::GroupSelected, session.state());

    let started = session.start().await.expect("start should not error");
    assert_eq!(StartOutcome::NotReady, started);

    let result = session.set_colour(&ColourTarget::Group, Colour::white());
    assert_matches!(result, Err(SessionError::State(StateError::NotStreaming)));
}

#[tokio::test]
async fn rgb_update_covers_the_whole_group() {
    let session = streaming_session().await;

    let updated = session
        .set_colour(&ColourTarget::Group, Colour::from_rgb8(255, 0, 0))
        .expect("group colour update should succeed");
    assert_eq!(3, updated);

    let snapshot = session.mixer().snapshot();
    for fixture_id in ["1", "2", "3"] {
        let colour = snapshot
            .colour_of(fixture_id)
            .expect("every group fixture should carry a colour");
        assert_eq!((1.0, 0.0, 0.0, 1.0), colour.channels());
    }

    let lights = session.light_ids().expect("light ids should resolve");
    assert_eq!(vec!["1", "2", "3"], lights);
}

#[tokio::test]
async fn per_fixture_ct_update_leaves_other_fixtures_unchanged() {
    let session = streaming_session().await;

    let group_colour = Colour::from_mireds(450, 1.0).expect("warm mireds should convert");
    session
        .set_colour(&ColourTarget::Group, group_colour)
        .expect("group colour update should succeed");

    let fixture_colour = Colour::from_mireds(300, 0.5).expect("mid mireds should convert");
    let updated = session
        .set_colour(&ColourTarget::Fixture("3".to_string()), fixture_colour)
        .expect("single-fixture update should succeed");
    assert_eq!(1, updated);

    let snapshot = session.mixer().snapshot();
    assert_eq!(Some(group_colour), snapshot.colour_of("1"));
    assert_eq!(Some(group_colour), snapshot.colour_of("2"));
    assert_eq!(Some(fixture_colour), snapshot.colour_of("3"));
    assert!(group_colour != fixture_colour);
}

#[tokio::test]
async fn brightness_update_scales_white() {
    let session = streaming_session().await;

    session
        .set_brightness(&ColourTarget::Group, 0.5)
        .expect("brightness update should succeed");

    let snapshot = session.mixer().snapshot();
    assert_eq!(
        (0.5, 0.5, 0.5, 1.0),
        snapshot
            .colour_of("2")
            .expect("fixture should carry a colour")
            .channels()
    );

    let result = session.set_brightness(&ColourTarget::Group, 1.5);
    assert_matches!(result, Err(SessionError::Colour(_)));
}

#[tokio::test]
async fn stop_parks_the_effect_and_a_write_re_arms_it() {
    let session = streaming_session().await;
    session
        .set_colour(&ColourTarget::Group, Colour::white())
        .expect("colour update should succeed");

    assert!(session.stop());
    assert!(!session.mixer().is_enabled());
    assert_eq!(SessionState::Stopped, session.state());

    session
        .set_colour(&ColourTarget::Group, Colour::from_rgb8(0, 0, 255))
        .expect("a write after stop should re-arm the effect");
    assert!(session.mixer().is_enabled());
    assert_eq!(SessionState::Streaming, session.state());
}

#[tokio::test]
async fn shutdown_is_terminal_and_idempotent() {
    let session = streaming_session().await;

    assert!(session.shutdown().await);
    assert_eq!(SessionState::ShutDown, session.state());

    let write = session.set_colour(&ColourTarget::Group, Colour::white());
    assert_matches!(write, Err(SessionError::State(StateError::ShutDown)));

    let init = session.initialize("app", "device");
    assert_matches!(init, Err(SessionError::State(StateError::ShutDown)));

    assert!(session.shutdown().await);
    assert_eq!(SessionState::ShutDown, session.state());

    let status = session.status();
    assert!(!status.initialized());
    assert!(!status.connected());
    assert!(!status.streaming());
}

#[tokio::test]
async fn status_reports_the_active_bridge() {
    let session = streaming_session().await;
    let status = session.status();

    assert!(status.initialized());
    assert!(status.connected());
    assert!(status.streaming());
    assert_eq!(SessionState::Streaming, status.state());
    assert_eq!(Some("200"), status.selected_group());

    let bridge = status.bridge().expect("an active bridge should be reported");
    assert_eq!("bridge-1", bridge.id());
    assert_eq!("10.0.0.2", bridge.ip());
    assert!(bridge.connected());
    assert!(bridge.streaming());
}

#[tokio::test]
async fn stop_is_callable_in_any_state() {
    let session = session();
    assert!(session.stop());
    session
        .initialize("app", "device")
        .expect("initialise should succeed");
    assert!(session.stop());
}
