//! Multi-site convergence through the public controller API.
//!
//! A tiny in-process "relay" collects every site's outbound batches in one
//! global order and delivers each to all other sites, which is exactly what
//! the real relay guarantees. No sockets, no timers: deadlines are driven by
//! hand.

use quill_client::{ChangeNotifier, ClientConfig, MemorySurface, SyncController, SyncOutcome};
use quill_types::{ClientMessage, SiteId};
use tokio::sync::mpsc;
use tokio::time::Instant;

type Controller = SyncController<MemorySurface, mpsc::UnboundedSender<ClientMessage>>;

struct Site {
    controller: Controller,
    surface: MemorySurface,
    outbox: mpsc::UnboundedReceiver<ClientMessage>,
}

impl Site {
    fn join(site: u32) -> Self {
        let surface = MemorySurface::new();
        let (tx, outbox) = mpsc::unbounded_channel();
        let mut controller = SyncController::new(
            &ClientConfig::default(),
            surface.clone(),
            tx,
            ChangeNotifier::new(|| {}),
        );
        controller.begin();
        controller.on_site_id(SiteId::new(site)).unwrap();
        Self {
            controller,
            surface,
            outbox,
        }
    }

    fn edit(&mut self, text: &str) -> SyncOutcome {
        assert!(self.surface.edit(text));
        let deadline = self.controller.on_surface_changed(Instant::now());
        self.controller.on_timer_fired(deadline).unwrap()
    }

    fn text(&self) -> String {
        self.controller.display_text().unwrap()
    }
}

/// Deliver every queued batch, site by site, to every other site.
fn relay(sites: &mut [Site]) {
    loop {
        let mut log = Vec::new();
        for (from, site) in sites.iter_mut().enumerate() {
            while let Ok(ClientMessage::TextOperations(batch)) = site.outbox.try_recv() {
                log.push((from, batch));
            }
        }
        if log.is_empty() {
            return;
        }
        for (from, batch) in log {
            for (to, site) in sites.iter_mut().enumerate() {
                if to != from {
                    site.controller.on_remote_batch(&batch).unwrap();
                }
            }
        }
    }
}

fn assert_converged(sites: &[Site]) -> String {
    let text = sites[0].text();
    for site in sites {
        assert_eq!(site.text(), text);
        assert_eq!(site.surface.current(), text);
        assert_eq!(site.controller.baseline().text(), text);
    }
    text
}

#[test]
fn test_insert_and_delete_round_trip() {
    let mut sites = vec![Site::join(1), Site::join(2)];

    sites[0].edit("X");
    relay(&mut sites);
    assert_eq!(sites[1].text(), "X");

    sites[1].edit("");
    relay(&mut sites);
    assert_eq!(sites[0].text(), "");
    assert_eq!(sites[0].surface.current(), "");
}

#[test]
fn test_concurrent_inserts_at_same_spot() {
    let mut sites = vec![Site::join(1), Site::join(2), Site::join(3)];

    sites[0].edit("ac");
    relay(&mut sites);

    sites[0].edit("a1c");
    sites[1].edit("a2c");
    sites[2].edit("a3c");
    relay(&mut sites);

    let text = assert_converged(&sites);
    assert_eq!(text.len(), 6);
    assert!(text.starts_with('a') && text.ends_with('c'));
}

#[test]
fn test_concurrent_delete_of_same_character() {
    let mut sites = vec![Site::join(1), Site::join(2)];

    sites[0].edit("abc");
    relay(&mut sites);

    sites[0].edit("ac");
    sites[1].edit("ac");
    relay(&mut sites);

    assert_eq!(assert_converged(&sites), "ac");
}

#[test]
fn test_delete_races_insert_next_to_it() {
    let mut sites = vec![Site::join(1), Site::join(2)];

    sites[0].edit("hello");
    relay(&mut sites);

    sites[0].edit("help");
    sites[1].edit("hello!");
    relay(&mut sites);

    assert_eq!(assert_converged(&sites), "help!");
}

#[test]
fn test_long_session_stays_in_sync() {
    let mut sites = vec![Site::join(1), Site::join(2)];
    let script = [
        (0, "The cat"),
        (1, "The cat sat"),
        (0, "The black cat sat"),
        (1, "The black cat sat on the mat"),
        (0, "A black cat sat on the mat"),
        (1, "A black cat sat on a mat."),
    ];

    for (who, text) in script {
        sites[who].edit(text);
        relay(&mut sites);
        assert_eq!(assert_converged(&sites), text);
    }

    // Remote writes never turned into local edits.
    for site in &sites {
        let stats = site.controller.stats();
        assert_eq!(stats.batches_sent, 3);
        assert_eq!(stats.batches_integrated, 3);
    }
}
