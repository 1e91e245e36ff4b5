//! Integration tests for the simulated platform

use device_platform::sim::{ScriptedTransition, SimPlatform};
use device_platform::{
    AppConfig, ContextAllocator, DeviceContext, NetworkStatus, Notification, NotificationKind,
    NotificationService, PlatformError, PlatformRuntime,
};
use link_signal::{ConnectivitySignal, WaitTimeout};
use rstest::rstest;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn temp_config_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "rabbit-platform-{}-{}.json",
        tag,
        std::process::id()
    ))
}

#[test]
fn runtime_restores_persisted_config() {
    let path = temp_config_path("restore");
    let stored = AppConfig {
        device_name: "kitchen-rabbit".to_string(),
        volume: 25,
        wifi_ssid: Some("home".to_string()),
        ..Default::default()
    };
    std::fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

    let platform = SimPlatform::new().unwrap();
    platform.runtime().set_link_script(Vec::new());

    let mut ctx = platform.allocator().allocate().unwrap();
    platform.runtime().init(&mut ctx, Some(path.as_path())).unwrap();

    assert!(ctx.is_ready());
    assert!(ctx.restored_from_storage());
    assert_eq!(ctx.config(), &stored);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn runtime_uses_defaults_when_config_missing() {
    let platform = SimPlatform::new().unwrap();
    platform.runtime().set_link_script(Vec::new());

    let mut ctx = DeviceContext::new();
    platform
        .runtime()
        .init(&mut ctx, Some(temp_config_path("missing").as_path()))
        .unwrap();

    assert!(!ctx.restored_from_storage());
    assert_eq!(ctx.config(), &AppConfig::default());
}

#[test]
fn runtime_rejects_corrupt_config() {
    let path = temp_config_path("corrupt");
    std::fs::write(&path, "{ not json").unwrap();

    let platform = SimPlatform::new().unwrap();
    let mut ctx = DeviceContext::new();
    let err = platform.runtime().init(&mut ctx, Some(path.as_path())).unwrap_err();

    assert!(matches!(err, PlatformError::ConfigLoad { .. }));
    assert!(!ctx.is_ready());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn scripted_link_up_reaches_subscriber() {
    let platform = SimPlatform::new().unwrap();
    platform.runtime().set_link_script(vec![
        ScriptedTransition::new(NetworkStatus::StationDown, Duration::from_millis(5)),
        ScriptedTransition::new(NetworkStatus::StationUp, Duration::from_millis(20)),
    ]);

    let signal = ConnectivitySignal::new();
    let notifier = signal.notifier();
    let id = platform
        .notifications()
        .subscribe(
            NotificationKind::WifiStatusChanged,
            Arc::new(move |n: &Notification| {
                if n.network_status() == Some(NetworkStatus::StationUp) {
                    notifier.notify();
                }
            }),
        )
        .unwrap();

    let mut ctx = DeviceContext::new();
    platform.runtime().init(&mut ctx, None).unwrap();

    signal
        .wait(WaitTimeout::After(Duration::from_secs(2)))
        .unwrap();
    assert!(platform
        .notifications()
        .unsubscribe(NotificationKind::WifiStatusChanged, id));
}

#[rstest]
#[case::allocator("allocator")]
#[case::runtime("runtime")]
#[case::subscribe("subscribe")]
#[case::driver("driver")]
#[case::worker("worker")]
#[case::firmware("firmware")]
fn injected_faults_fail_the_service(#[case] service: &str) {
    use device_platform::{FirmwareSource, HardwareDriver, WorkerLauncher};

    let platform = SimPlatform::new().unwrap();
    platform.runtime().set_link_script(Vec::new());

    let failed = match service {
        "allocator" => {
            platform.allocator().fault().set_failing(true);
            platform.allocator().allocate().is_err()
        }
        "runtime" => {
            platform.runtime().fault().set_failing(true);
            platform.runtime().init(&mut DeviceContext::new(), None).is_err()
        }
        "subscribe" => {
            platform.notifications().subscribe_fault().set_failing(true);
            platform
                .notifications()
                .subscribe(NotificationKind::WifiStatusChanged, Arc::new(|_: &Notification| {}))
                .is_err()
        }
        "driver" => {
            platform.driver().fault().set_failing(true);
            platform.driver().init().is_err()
        }
        "worker" => {
            platform.worker().fault().set_failing(true);
            platform.worker().start("audio-test").is_err()
        }
        "firmware" => {
            platform.firmware().fault().set_failing(true);
            platform.firmware().query().is_err()
        }
        other => panic!("unknown service {other}"),
    };

    assert!(failed, "{service} should fail with an injected fault");
}
