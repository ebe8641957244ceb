//! Dispatcher tests driven by simulated I/O cycles.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, Weak,
};

use patina_io_trap::{
    dispatcher::{IoTrapDispatcher, IO_TRAP_MERGED_LENGTH},
    protocol::{
        DispatchHandle, IoTrapCallback, IoTrapContext, IoTrapExDispatch, IoTrapExRegisterContext,
        IoTrapRegisterContext, IoTrapType, PchSmmIoTrapControl, SmmIoTrapDispatch2,
    },
};
use patina_platform_sdk::error::EfiError;

use super::fake_pch::{init_logger, FakeIoSpace, FakePch};

type Dispatcher = IoTrapDispatcher<FakePch, FakeIoSpace>;

fn dispatcher() -> Dispatcher {
    init_logger();
    IoTrapDispatcher::new(FakePch::default(), FakeIoSpace::new(0x1000, 0x2000))
}

fn recording_callback(log: &Arc<Mutex<Vec<u32>>>) -> IoTrapCallback {
    let log = log.clone();
    Arc::new(move |_: DispatchHandle, context: &IoTrapContext| log.lock().unwrap().push(context.write_data))
}

fn context(address: u16, length: u16, trap_type: IoTrapType) -> IoTrapRegisterContext {
    IoTrapRegisterContext { address, length, trap_type }
}

#[test]
fn test_drivers_share_merged_window() {
    let dispatcher = dispatcher();
    let first_log = Arc::new(Mutex::new(Vec::new()));
    let second_log = Arc::new(Mutex::new(Vec::new()));

    let mut first = context(0, 8, IoTrapType::Write);
    let mut second = context(0, 4, IoTrapType::ReadWrite);
    dispatcher.register(recording_callback(&first_log), &mut first).unwrap();
    dispatcher.register(recording_callback(&second_log), &mut second).unwrap();

    assert_eq!(first.address, 0x1000);
    assert_eq!(second.address, 0x1008);
    assert_eq!(dispatcher.hardware().register(0).length(), IO_TRAP_MERGED_LENGTH);
    assert_eq!(dispatcher.registers_in_use(), 1);

    assert!(dispatcher.hardware().io_cycle(first.address + 1, true, 0xAB));
    assert_eq!(dispatcher.dispatch(), 1);
    assert!(dispatcher.hardware().io_cycle(second.address, false, 0));
    assert_eq!(dispatcher.dispatch(), 1);

    // Inside the window but outside both ranges.
    assert!(dispatcher.hardware().io_cycle(0x1080, true, 0x11));
    assert_eq!(dispatcher.dispatch(), 0);
    assert_eq!(dispatcher.hardware().pending_status(), 0);

    assert_eq!(*first_log.lock().unwrap(), [0xAB00]);
    assert_eq!(*second_log.lock().unwrap(), [0]);
}

#[test]
fn test_dedicated_traps_use_their_own_registers() {
    let dispatcher = dispatcher();
    let reads = Arc::new(Mutex::new(Vec::new()));
    let writes = Arc::new(Mutex::new(Vec::new()));

    dispatcher.register(recording_callback(&reads), &mut context(0xB2, 1, IoTrapType::Read)).unwrap_err();
    dispatcher.register(recording_callback(&reads), &mut context(0xB0, 4, IoTrapType::Read)).unwrap();
    dispatcher.register(recording_callback(&writes), &mut context(0x800, 0x20, IoTrapType::Write)).unwrap();
    assert_eq!(dispatcher.registers_in_use(), 2);

    assert!(!dispatcher.hardware().io_cycle(0xB2, true, 1));
    assert!(dispatcher.hardware().io_cycle(0xB2, false, 0));
    assert!(dispatcher.hardware().io_cycle(0x81F, true, 0x5A));
    assert_eq!(dispatcher.dispatch(), 1);

    assert_eq!(reads.lock().unwrap().len(), 0);
    assert_eq!(*writes.lock().unwrap(), [0x5A00_0000]);
    assert!(dispatcher.hardware().io_cycle(0xB1, false, 0));
    assert_eq!(dispatcher.dispatch(), 1);
    assert_eq!(reads.lock().unwrap().len(), 1);
}

#[test]
fn test_callback_unregisters_itself() {
    init_logger();
    let io_space = FakeIoSpace::new(0x1000, 0x2000);
    let dispatcher = Arc::new(IoTrapDispatcher::new(FakePch::default(), io_space));
    let calls = Arc::new(AtomicUsize::new(0));

    let weak: Weak<Dispatcher> = Arc::downgrade(&dispatcher);
    let counter = calls.clone();
    let callback: IoTrapCallback = Arc::new(move |handle: DispatchHandle, _: &IoTrapContext| {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(dispatcher) = weak.upgrade() {
            dispatcher.unregister(handle).unwrap();
        }
    });

    let mut context = context(0, 4, IoTrapType::Write);
    dispatcher.register(callback, &mut context).unwrap();
    assert_eq!(dispatcher.registers_in_use(), 1);

    assert!(dispatcher.hardware().io_cycle(context.address, true, 1));
    assert_eq!(dispatcher.dispatch(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.registers_in_use(), 0);

    assert!(!dispatcher.hardware().io_cycle(context.address, true, 1));
    assert_eq!(dispatcher.dispatch(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_merged_window_is_returned_to_io_space() {
    init_logger();
    let dispatcher = IoTrapDispatcher::new(FakePch::default(), FakeIoSpace::new(0x1000, 0x1100));

    let mut context = context(0, 4, IoTrapType::Write);
    let handle = dispatcher.register(recording_callback(&Arc::default()), &mut context).unwrap();
    dispatcher.unregister(handle).unwrap();
    assert_eq!(dispatcher.registers_in_use(), 0);

    context.address = 0;
    dispatcher.register(recording_callback(&Arc::default()), &mut context).unwrap();
    assert_eq!(context.address, 0x1000);
}

#[test]
fn test_io_space_exhaustion() {
    init_logger();
    let dispatcher = IoTrapDispatcher::new(FakePch::default(), FakeIoSpace::new(0x1000, 0x1100));

    for _ in 0..4 {
        dispatcher.register(recording_callback(&Arc::default()), &mut context(0, 0x40, IoTrapType::Write)).unwrap();
    }
    assert_eq!(
        dispatcher.register(recording_callback(&Arc::default()), &mut context(0, 4, IoTrapType::Write)),
        Err(EfiError::OutOfResources)
    );
    assert_eq!(dispatcher.registers_in_use(), 1);
}

#[test]
fn test_pause_stops_trapping() {
    let dispatcher = dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));
    let handle = dispatcher.register(recording_callback(&log), &mut context(0x800, 4, IoTrapType::Write)).unwrap();

    dispatcher.pause(handle).unwrap();
    assert!(!dispatcher.hardware().io_cycle(0x800, true, 1));
    assert_eq!(dispatcher.pause(handle), Err(EfiError::AccessDenied));

    dispatcher.resume(handle).unwrap();
    assert!(dispatcher.hardware().io_cycle(0x800, true, 2));
    assert_eq!(dispatcher.dispatch(), 1);
    assert_eq!(*log.lock().unwrap(), [2]);
}

#[test]
fn test_io_trap_ex_filters_byte_enables() {
    let dispatcher = dispatcher();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let ex_context = IoTrapExRegisterContext {
        address: 0x840,
        length: 4,
        trap_type: IoTrapType::ReadWrite,
        byte_enable: 0x1,
        byte_enable_mask: 0xE,
    };

    let handle = dispatcher
        .register_ex(
            Arc::new(move |context: &IoTrapExRegisterContext| recorder.lock().unwrap().push(*context)),
            ex_context,
        )
        .unwrap();

    assert!(!dispatcher.hardware().io_cycle(0x841, true, 0));
    assert!(dispatcher.hardware().io_cycle(0x840, false, 0));
    assert_eq!(dispatcher.dispatch(), 1);
    assert_eq!(*seen.lock().unwrap(), [ex_context]);

    dispatcher.unregister_ex(handle).unwrap();
    assert_eq!(dispatcher.registers_in_use(), 0);
}

#[test]
fn test_dispatch_continues_after_ready_to_lock() {
    let dispatcher = dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));
    let handle = dispatcher.register(recording_callback(&log), &mut context(0x900, 4, IoTrapType::Write)).unwrap();

    dispatcher.smm_ready_to_lock();

    assert_eq!(dispatcher.unregister(handle), Err(EfiError::AccessDenied));
    assert!(dispatcher.hardware().io_cycle(0x902, true, 7));
    assert_eq!(dispatcher.dispatch(), 1);
    assert_eq!(*log.lock().unwrap(), [0x0007_0000]);
}

#[test]
fn test_one_dispatch_services_every_pending_register() {
    let dispatcher = dispatcher();
    let first_log = Arc::new(Mutex::new(Vec::new()));
    let second_log = Arc::new(Mutex::new(Vec::new()));
    let merged_log = Arc::new(Mutex::new(Vec::new()));

    let mut first = context(0x1840, 4, IoTrapType::Write);
    let mut second = context(0x1880, 4, IoTrapType::Write);
    let mut merged = context(0, 4, IoTrapType::ReadWrite);
    dispatcher.register(recording_callback(&first_log), &mut first).unwrap();
    dispatcher.register(recording_callback(&second_log), &mut second).unwrap();
    dispatcher.register(recording_callback(&merged_log), &mut merged).unwrap();
    assert_eq!(merged.address, 0x1000);
    assert_eq!(dispatcher.registers_in_use(), 3);

    // Three registers trap before the SMI is handled. The PSTH keeps only the last trapped cycle.
    assert!(dispatcher.hardware().io_cycle(first.address, true, 0x11));
    assert!(dispatcher.hardware().io_cycle(second.address, true, 0x22));
    assert!(dispatcher.hardware().io_cycle(merged.address, true, 0x33));
    assert_eq!(dispatcher.hardware().pending_status(), 0b111);

    assert_eq!(dispatcher.dispatch(), 1);
    assert_eq!(dispatcher.hardware().pending_status(), 0);
    assert_eq!(*merged_log.lock().unwrap(), [0x33]);
    assert!(first_log.lock().unwrap().is_empty());
    assert!(second_log.lock().unwrap().is_empty());

    // Nothing is left pending for a second pass.
    assert_eq!(dispatcher.dispatch(), 0);

    // Each register still traps on its own afterwards.
    assert!(dispatcher.hardware().io_cycle(first.address, true, 0x44));
    assert_eq!(dispatcher.dispatch(), 1);
    assert!(dispatcher.hardware().io_cycle(second.address + 1, true, 0x55));
    assert_eq!(dispatcher.dispatch(), 1);
    assert_eq!(*first_log.lock().unwrap(), [0x44]);
    assert_eq!(*second_log.lock().unwrap(), [0x5500]);
}
