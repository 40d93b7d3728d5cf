/// Voice frames between a capture thread, a sender and a receiver

use std::{sync::Arc, thread};

use tether_shared::{BitReader, BitWriter, VoiceConfig, VoiceRingBuffer};

fn message(buffer: &VoiceRingBuffer) -> Vec<u8> {
    let mut writer = BitWriter::new();
    buffer.write(&mut writer);
    writer.to_bytes()
}

fn deliver(bytes: &[u8], receiver: &VoiceRingBuffer) -> bool {
    let mut reader = BitReader::new(bytes);
    let adopted = receiver.read(&mut reader).unwrap();
    reader.finish().unwrap();
    adopted
}

#[test]
fn receiver_adopts_five_newer_frames() {
    let sender = VoiceRingBuffer::starting_at(VoiceConfig::default(), 9);
    for seq in 10u8..=14 {
        assert_eq!(sender.enqueue(&[seq; 3]), Some(u16::from(seq)));
    }
    let receiver = VoiceRingBuffer::starting_at(VoiceConfig::default(), 9);

    assert!(deliver(&message(&sender), &receiver));

    assert_eq!(receiver.latest_sequence_id(), 14);
    let frames = receiver.frames_after(9);
    let ids: Vec<u16> = frames.iter().map(|(seq, _)| *seq).collect();
    assert_eq!(ids, vec![10, 11, 12, 13, 14]);
    assert_eq!(&*frames[0].1, &[10u8; 3][..]);
}

#[test]
fn stale_message_is_consumed_and_ignored() {
    let old = VoiceRingBuffer::starting_at(VoiceConfig::default(), 3);
    for _ in 0..5 {
        old.enqueue(&[1, 2]);
    }
    let receiver = VoiceRingBuffer::starting_at(VoiceConfig::default(), 9);
    for _ in 0..5 {
        receiver.enqueue(&[7]);
    }
    assert_eq!(old.latest_sequence_id(), 8);
    assert_eq!(receiver.latest_sequence_id(), 14);

    let before = receiver.snapshot();
    assert!(!deliver(&message(&old), &receiver));

    assert_eq!(receiver.snapshot(), before);
}

#[test]
fn sequence_wraps_to_zero() {
    let sender = VoiceRingBuffer::starting_at(VoiceConfig::default(), 65535);
    let receiver = VoiceRingBuffer::starting_at(VoiceConfig::default(), 65535);

    assert_eq!(sender.enqueue(&[0xAB]), Some(0));
    assert!(deliver(&message(&sender), &receiver));

    assert_eq!(receiver.latest_sequence_id(), 0);
    assert_eq!(receiver.frame(0).as_deref(), Some(&[0xABu8][..]));
}

#[test]
fn single_lost_message_is_covered_by_redundancy() {
    let sender = VoiceRingBuffer::new(VoiceConfig::default());
    let receiver = VoiceRingBuffer::new(VoiceConfig::default());

    sender.enqueue(&[1]);
    let lost = message(&sender);
    sender.enqueue(&[2]);
    let arrived = message(&sender);
    drop(lost);

    assert!(deliver(&arrived, &receiver));
    assert_eq!(receiver.frame(1).as_deref(), Some(&[1u8][..]));
    assert_eq!(receiver.frame(2).as_deref(), Some(&[2u8][..]));
}

#[test]
fn oversized_frame_is_refused() {
    let sender = VoiceRingBuffer::new(VoiceConfig::default());

    assert_eq!(sender.enqueue(&[0; 256]), None);
    assert_eq!(sender.latest_sequence_id(), 0);
    assert_eq!(sender.enqueue(&[0; 255]), Some(1));
}

#[test]
fn capture_and_send_threads_share_the_buffer() {
    let buffer = Arc::new(VoiceRingBuffer::new(VoiceConfig::default()));
    let receiver = VoiceRingBuffer::new(VoiceConfig::default());

    let capture = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || {
            for i in 0..500u16 {
                buffer.enqueue(&i.to_le_bytes());
            }
        })
    };

    let mut adopted = 0;
    for _ in 0..200 {
        if deliver(&message(&buffer), &receiver) {
            adopted += 1;
        }
        thread::yield_now();
    }
    capture.join().unwrap();
    if deliver(&message(&buffer), &receiver) {
        adopted += 1;
    }

    assert!(adopted >= 1);
    assert_eq!(receiver.latest_sequence_id(), 500);
    assert_eq!(receiver.frame(500).as_deref(), Some(&499u16.to_le_bytes()[..]));
}
