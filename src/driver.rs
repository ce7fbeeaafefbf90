use eyre::WrapErr;
use std::sync::mpsc::{sync_channel, Receiver, TryRecvError};
use tracing::debug;

use crate::{Simulation, Vertex};

/// Frames that may be computed ahead of the consumer.
const FRAME_BUFFER: usize = 2;

/// Runs `sim` on its own thread, sending one frame of vertices after every `steps_per_frame`
/// ticks.
///
/// The thread stops between ticks once `stop_rx` is disconnected (or receives a message), or
/// once the returned receiver is dropped.
pub fn start_simulation<S>(
    mut sim: S,
    steps_per_frame: usize,
    stop_rx: Receiver<()>,
) -> eyre::Result<Receiver<Vec<Vertex>>>
where
    S: Simulation + 'static,
{
    let (vert_tx, vert_rx) = sync_channel(FRAME_BUFFER);

    std::thread::Builder::new()
        .name("simulation".into())
        .spawn(move || {
            let mut frame = 0usize;
            loop {
                match stop_rx.try_recv() {
                    Err(TryRecvError::Empty) => {}
                    _ => break,
                }

                let verts = sim.simulate_frame();
                for _ in 1..steps_per_frame {
                    sim.step();
                }

                if vert_tx.send(verts).is_err() {
                    break;
                }
                frame += 1;
            }
            debug!(frame, "Simulation thread stopped");
        })
        .wrap_err("Failed to spawn simulation thread")?;

    Ok(vert_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParticleLife, SimulationParameters};
    use std::sync::mpsc::channel;

    fn sim() -> ParticleLife {
        ParticleLife::new(SimulationParameters {
            num_particles: 30,
            seed: Some(9),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn frames_arrive_in_order() {
        let mut reference = sim();
        let expected = (0..3)
            .map(|_| {
                let verts = reference.simulate_frame();
                reference.step();
                verts
            })
            .collect::<Vec<_>>();

        let (stop_tx, stop_rx) = channel();
        let vert_rx = start_simulation(sim(), 2, stop_rx).unwrap();
        for verts in expected {
            assert_eq!(vert_rx.recv().unwrap(), verts);
        }
        drop(stop_tx);
    }

    #[test]
    fn stops_when_stop_sender_dropped() {
        let (stop_tx, stop_rx) = channel();
        let vert_rx = start_simulation(sim(), 1, stop_rx).unwrap();
        assert_eq!(vert_rx.recv().unwrap().len(), 30);
        drop(stop_tx);

        // Drain whatever was buffered; the channel must eventually close.
        while vert_rx.recv().is_ok() {}
    }

    #[test]
    fn stops_on_quit_message() {
        let (stop_tx, stop_rx) = channel();
        stop_tx.send(()).unwrap();
        let vert_rx = start_simulation(sim(), 1, stop_rx).unwrap();
        assert!(vert_rx.recv().is_err());
    }
}
