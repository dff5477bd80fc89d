use super::*;
use shared::{
    domain::{IconRecord, StateSnapshot},
    error::ApiError,
};

fn session() -> MatrixSession<Vec<ClientRequest>> {
    MatrixSession::new(GridSize::default(), Vec::new()).expect("session")
}

fn resync_pair() -> Vec<ClientRequest> {
    vec![ClientRequest::GetInitialState {}, ClientRequest::GetIcons {}]
}

fn count_resyncs(requests: &[ClientRequest]) -> (usize, usize) {
    let states = requests
        .iter()
        .filter(|r| matches!(r, ClientRequest::GetInitialState {}))
        .count();
    let icons = requests
        .iter()
        .filter(|r| matches!(r, ClientRequest::GetIcons {}))
        .count();
    (states, icons)
}

#[test]
fn new_session_waits_for_connection() {
    let session = session();
    assert_eq!(session.status(), ConnectionStatus::Connecting);
    assert!(session.sink().is_empty());
}

#[test]
fn connect_requests_state_and_icons() {
    let mut session = session();
    session.handle_channel_event(ChannelEvent::Connected);

    assert_eq!(session.status(), ConnectionStatus::Connected);
    assert_eq!(session.sink(), &resync_pair());
}

#[test]
fn repeated_connect_signal_does_not_duplicate_resync() {
    let mut session = session();
    session.on_connected();
    session.on_connected();
    assert_eq!(count_resyncs(session.sink()), (1, 1));
}

#[test]
fn reconnect_resyncs_once_regardless_of_prior_drops() {
    let mut session = session();
    session.on_connected();
    for _ in 0..3 {
        session.on_disconnected();
    }
    let before = session.sink().len();

    session.on_connected();

    assert_eq!(&session.sink()[before..], resync_pair().as_slice());
    assert_eq!(count_resyncs(session.sink()), (2, 2));
}

#[test]
fn disconnect_is_reported_as_status_only() {
    let mut session = session();
    let mut rx = session.subscribe_events();
    session.on_connected();
    session.on_disconnected();

    assert_eq!(session.status(), ConnectionStatus::Disconnected);
    assert_eq!(
        rx.try_recv().expect("connected"),
        ClientEvent::ConnectionChanged(ConnectionStatus::Connected)
    );
    assert_eq!(
        rx.try_recv().expect("disconnected"),
        ClientEvent::ConnectionChanged(ConnectionStatus::Disconnected)
    );
    assert_eq!(count_resyncs(session.sink()), (1, 1));
}

#[test]
fn malformed_state_update_is_ignored() {
    let mut session = session();
    session.toggle(0, 0).expect("toggle");
    let before = session.grid().frame();

    session.handle_channel_event(ChannelEvent::Message(ServerEvent::StateUpdate(
        StateSnapshot {
            w: Some(13),
            h: Some(8),
            frame: Some(vec![1; 12]),
        },
    )));

    assert_eq!(session.grid().frame(), before);
}

#[test]
fn overflowing_dimensions_from_authority_are_ignored() {
    let mut session = session();
    session.handle_channel_event(ChannelEvent::Message(ServerEvent::StateUpdate(
        StateSnapshot {
            w: Some(usize::MAX / 2 + 1),
            h: Some(2),
            frame: None,
        },
    )));
    assert_eq!(session.grid().size(), GridSize::default());
}

#[test]
fn authority_error_leaves_state_untouched() {
    let mut session = session();
    session.handle_server_event(ServerEvent::Error(ApiError::not_found("no such icon")));
    assert!(session.grid().cells().iter().all(|cell| *cell == 0));
    assert!(session.sink().is_empty());
}

#[test]
fn toggle_then_snapshot_scenario() {
    let mut session = session();

    assert_eq!(session.toggle(0, 0), Ok(1));
    assert_eq!(session.grid().cells()[0], 1);
    assert_eq!(
        session.sink(),
        &vec![ClientRequest::set_xy(0, 0, 1)]
    );

    session.handle_server_event(ServerEvent::StateUpdate(StateSnapshot {
        w: None,
        h: None,
        frame: Some(vec![0; 104]),
    }));
    assert!(session.grid().cells().iter().all(|cell| *cell == 0));
}

#[test]
fn smile_save_scenario() {
    let mut session = session();
    session.handle_server_event(ServerEvent::IconsList(vec![IconRecord {
        name: "Smile".to_string(),
        frame: vec![0; 104],
    }]));

    session.edit_icon_name("smile");
    let rejected = session.save_icon("smile");
    assert!(matches!(rejected, SaveOutcome::Rejected { .. }));
    assert!(session.icons().name_error().is_some());
    assert!(session.sink().is_empty());

    session.edit_icon_name("smile2");
    assert_eq!(session.icons().name_error(), None);
    let submitted = session.save_icon("smile2");
    assert!(matches!(submitted, SaveOutcome::Submitted { .. }));
    assert_eq!(
        session.sink(),
        &vec![ClientRequest::SaveIcon {
            name: "smile2".to_string(),
            frame: session.grid().frame(),
        }]
    );
    assert_eq!(session.icons().name_error(), None);
}

#[test]
fn bulk_and_icon_requests_go_out_in_call_order() {
    let mut session = session();
    session.fill();
    session.load_icon("Heart");
    session.clear();
    session.delete_icon("Heart");

    assert_eq!(
        session.sink(),
        &vec![
            ClientRequest::Fill {},
            ClientRequest::LoadIcon {
                name: "Heart".to_string()
            },
            ClientRequest::Clear {},
            ClientRequest::DeleteIcon {
                name: "Heart".to_string()
            },
        ]
    );
    assert!(session.grid().cells().iter().all(|cell| *cell == 0));
}
