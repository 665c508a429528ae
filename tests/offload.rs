mod common;

use common::synthetic_image::{disc_mask, lighting, rgba_from_fn, texture};
use common::FailingAllocator;
use seamless_heal::{
    heal, heal_offload, AllocSite, DeviceBuffers, HealError, HealOptions, OffloadError,
    SystemAllocator,
};

const W: usize = 32;
const H: usize = 24;

#[derive(Debug, thiserror::Error)]
#[error("simulated transfer failure during {0}")]
struct TransferError(&'static str);

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    ReadSource,
    ReadDestination,
    WriteDestination,
}

/// In-memory stand-in for device-resident buffers.
struct FakeDevice {
    source: Vec<f32>,
    destination: Vec<f32>,
    fail_on: Option<Stage>,
    reads: usize,
    writes: usize,
}

impl FakeDevice {
    fn new(source: Vec<f32>, destination: Vec<f32>) -> Self {
        Self {
            source,
            destination,
            fail_on: None,
            reads: 0,
            writes: 0,
        }
    }

    fn check(&self, stage: Stage, name: &'static str) -> Result<(), TransferError> {
        if self.fail_on == Some(stage) {
            Err(TransferError(name))
        } else {
            Ok(())
        }
    }
}

impl DeviceBuffers for FakeDevice {
    type Error = TransferError;

    fn read_source(&mut self, host: &mut [f32]) -> Result<(), TransferError> {
        self.check(Stage::ReadSource, "read_source")?;
        host.copy_from_slice(&self.source);
        self.reads += 1;
        Ok(())
    }

    fn read_destination(&mut self, host: &mut [f32]) -> Result<(), TransferError> {
        self.check(Stage::ReadDestination, "read_destination")?;
        host.copy_from_slice(&self.destination);
        self.reads += 1;
        Ok(())
    }

    fn write_destination(&mut self, host: &[f32]) -> Result<(), TransferError> {
        self.check(Stage::WriteDestination, "write_destination")?;
        self.destination.copy_from_slice(host);
        self.writes += 1;
        Ok(())
    }
}

fn fixture() -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let mask = disc_mask(W, H, 16.0, 12.0, 7.0);
    let source = rgba_from_fn(W, H, |x, y| {
        let t = texture(x, y);
        [0.4 + t, 0.4, 0.4 - t, 1.0]
    });
    let destination = rgba_from_fn(W, H, lighting);
    (source, destination, mask)
}

#[test]
fn offload_matches_host_heal() {
    let (source, destination, mask) = fixture();
    let mut expected = destination.clone();
    let options = HealOptions::default();
    heal(&source, &mut expected, &mask, W, H, 4).expect("valid buffers");

    let mut device = FakeDevice::new(source, destination);
    let report = heal_offload(&mut device, &mask, W, H, &options, &SystemAllocator)
        .expect("offload succeeds");

    assert_eq!(device.reads, 2);
    assert_eq!(device.writes, 1);
    assert!(report.solve.iterations > 0);
    for (got, want) in device.destination.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-3);
    }
}

#[test]
fn transfer_failures_leave_device_destination_untouched() {
    for stage in [
        Stage::ReadSource,
        Stage::ReadDestination,
        Stage::WriteDestination,
    ] {
        let (source, destination, mask) = fixture();
        let mut device = FakeDevice::new(source, destination.clone());
        device.fail_on = Some(stage);

        let err = heal_offload(
            &mut device,
            &mask,
            W,
            H,
            &HealOptions::default(),
            &SystemAllocator,
        )
        .unwrap_err();

        assert!(matches!(err, OffloadError::Transfer(_)), "{err}");
        assert_eq!(device.writes, 0);
        assert_eq!(device.destination, destination);
    }
}

#[test]
fn staging_allocation_failure_skips_transfers() {
    for site in [AllocSite::HostSource, AllocSite::HostDestination] {
        let (source, destination, mask) = fixture();
        let mut device = FakeDevice::new(source, destination.clone());

        let err = heal_offload(
            &mut device,
            &mask,
            W,
            H,
            &HealOptions::default(),
            &FailingAllocator { fail_at: site },
        )
        .unwrap_err();

        assert!(matches!(
            err,
            OffloadError::Heal(HealError::Allocation { site: s, .. }) if s == site
        ));
        assert_eq!(device.reads, 0);
        assert_eq!(device.destination, destination);
    }
}

#[test]
fn heal_errors_are_not_written_back() {
    let (source, destination, _) = fixture();
    let mut device = FakeDevice::new(source, destination.clone());
    let short_mask = vec![1.0; W * H - 1];

    let err = heal_offload(
        &mut device,
        &short_mask,
        W,
        H,
        &HealOptions::default(),
        &SystemAllocator,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        OffloadError::Heal(HealError::BufferSizeMismatch { buffer: "mask", .. })
    ));
    assert_eq!(device.writes, 0);
    assert_eq!(device.destination, destination);
}
