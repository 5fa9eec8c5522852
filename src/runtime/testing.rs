//! Mock transport and whole-dialogue tests
//!
//! These drive the session actor end to end without touching the network.

use super::traits::{FileRef, Transport};
use crate::transport::TransportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A document handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDocument {
    pub chat_id: i64,
    pub file_name: String,
    /// Staged file the upload was read from
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Mock transport that records outbound traffic and serves registered files
#[derive(Default)]
pub struct MockTransport {
    texts: Mutex<Vec<(i64, String)>>,
    documents: Mutex<Vec<SentDocument>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    downloads: Mutex<Vec<String>>,
    /// Number of upcoming `send_document` calls to fail
    failing_documents: Mutex<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `file_id` downloadable
    pub fn add_file(&self, file_id: &str, bytes: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), bytes.into());
    }

    pub fn fail_next_documents(&self, count: usize) {
        *self.failing_documents.lock().unwrap() = count;
    }

    pub fn texts(&self) -> Vec<(i64, String)> {
        self.texts.lock().unwrap().clone()
    }

    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.texts()
            .into_iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.texts.lock().unwrap().last().map(|(_, text)| text.clone())
    }

    pub fn documents(&self) -> Vec<SentDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.texts
            .lock()
            .unwrap()
            .push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        path: &Path,
    ) -> Result<(), TransportError> {
        {
            let mut failing = self.failing_documents.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(TransportError::network("sendDocument: mock failure"));
            }
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TransportError::unknown(format!("sendDocument: {e}")))?;
        self.documents.lock().unwrap().push(SentDocument {
            chat_id,
            file_name: file_name.to_string(),
            path: path.to_path_buf(),
            bytes,
        });
        Ok(())
    }

    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, TransportError> {
        self.downloads.lock().unwrap().push(file.file_id.clone());
        self.files
            .lock()
            .unwrap()
            .get(&file.file_id)
            .cloned()
            .ok_or_else(|| TransportError::invalid_request("getFile: unknown file"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{
        Command, Inbound, InboundKind, InputKind, RuntimeManager, SessionInput, SessionRuntime,
        WorkDir,
    };
    use crate::state_machine::{prompts, Event, Feature, SessionContext, SessionState};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    const USER: i64 = 7;
    const LIMIT: u64 = 1024 * 1024;

    struct Harness {
        runtime: SessionRuntime<Arc<MockTransport>>,
        transport: Arc<MockTransport>,
        work: TempDir,
        _input_tx: mpsc::UnboundedSender<SessionInput>,
    }

    impl Harness {
        fn new() -> Self {
            let transport = Arc::new(MockTransport::new());
            let work = tempfile::tempdir().unwrap();
            let (input_tx, input_rx) = mpsc::unbounded_channel();
            let runtime = SessionRuntime::new(
                SessionContext::new(USER, USER),
                Arc::clone(&transport),
                WorkDir::new(work.path()),
                LIMIT,
                input_rx,
                CancellationToken::new(),
            );
            Self {
                runtime,
                transport,
                work,
                _input_tx: input_tx,
            }
        }

        async fn event(&mut self, event: Event) {
            self.runtime
                .handle(SessionInput {
                    chat_id: USER,
                    kind: InputKind::Event(event),
                })
                .await;
        }

        async fn say(&mut self, text: &str) {
            self.event(Event::text(text)).await;
        }

        async fn upload(&mut self, file_name: &str, bytes: &[u8]) {
            let file_id = format!("id-{file_name}");
            self.transport.add_file(&file_id, bytes);
            self.attach(FileRef {
                file_id,
                file_name: file_name.to_string(),
                size: Some(u64::try_from(bytes.len()).unwrap()),
            })
            .await;
        }

        async fn attach(&mut self, file: FileRef) {
            self.runtime
                .handle(SessionInput {
                    chat_id: USER,
                    kind: InputKind::Attachment(file),
                })
                .await;
        }

        fn session_dirs(&self) -> usize {
            std::fs::read_dir(self.work.path()).unwrap().count()
        }
    }

    async fn convert_until_upload(h: &mut Harness) {
        h.event(Event::Begin(Feature::Convert)).await;
        h.say("Budi").await;
        h.say("kontak").await;
        h.say("tidak").await;
        h.say("1").await;
        h.say("1").await;
        assert!(h.runtime.state().awaits_upload());
    }

    #[tokio::test]
    async fn test_convert_dialogue_delivers_numbered_file() {
        let mut h = Harness::new();
        convert_until_upload(&mut h).await;

        h.upload("nomor.txt", b"0812345\n\nabc0813999\n").await;
        let docs = h.transport.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].chat_id, USER);
        // sent from a staged copy that is discarded afterwards
        assert!(docs[0].path.starts_with(h.work.path()));
        assert!(docs[0].path.ends_with("kontak-01.vcf"));
        assert!(!docs[0].path.exists());
        assert_eq!(docs[0].file_name, "kontak-01.vcf");
        assert_eq!(
            String::from_utf8(docs[0].bytes.clone()).unwrap(),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Budi 1\nTEL:+0812345\nEND:VCARD\n\
             BEGIN:VCARD\nVERSION:3.0\nFN:Budi 2\nTEL:+0813999\nEND:VCARD\n"
        );
        assert_eq!(h.transport.last_text().as_deref(), Some(prompts::DECISION));

        h.say("selesai").await;
        assert_eq!(h.runtime.state(), &SessionState::Idle);
        assert_eq!(h.transport.last_text().as_deref(), Some(prompts::THANKS));
        assert_eq!(h.session_dirs(), 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_state() {
        let mut h = Harness::new();
        convert_until_upload(&mut h).await;
        let before = h.runtime.state().clone();

        h.transport.fail_next_documents(1);
        h.upload("nomor.txt", b"0812345\n").await;
        assert!(h.transport.documents().is_empty());
        assert_eq!(h.runtime.state(), &before);
        assert_eq!(
            h.transport.last_text().as_deref(),
            Some(prompts::DELIVERY_FAILED)
        );

        h.upload("nomor.txt", b"0812345\n").await;
        let docs = h.transport.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "kontak-01.vcf");
    }

    #[tokio::test]
    async fn test_staged_file_is_what_gets_sent() {
        let mut h = Harness::new();
        h.event(Event::Begin(Feature::Rename)).await;
        h.upload("../../grup.vcf", b"BEGIN:VCARD\nFN:Alice\nTEL:+1\nEND:VCARD\n")
            .await;
        h.say("tidak").await;
        h.say("Alice").await;
        h.say("Bob").await;

        let docs = h.transport.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].bytes, b"BEGIN:VCARD\nFN:Bob\nTEL:+1\nEND:VCARD\n");
        let dir = docs[0].path.parent().unwrap();
        assert_eq!(dir.parent(), Some(h.work.path()));
        assert_eq!(h.session_dirs(), 0);
    }

    #[tokio::test]
    async fn test_split_delivers_to_other_chat() {
        let mut h = Harness::new();
        h.event(Event::Begin(Feature::Split)).await;
        h.say("Tim").await;
        h.say("tim").await;
        h.say("3").await;
        h.say("ya").await;
        h.say("99").await;

        let vcf: String = (1..=10)
            .map(|i| format!("BEGIN:VCARD\nVERSION:3.0\nFN:Old {i}\nTEL;TYPE=CELL:+62{i}\nEND:VCARD\n"))
            .collect();
        h.upload("semua.vcf", vcf.as_bytes()).await;

        let docs = h.transport.documents();
        let names: Vec<&str> = docs.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, ["tim_part_1.vcf", "tim_part_2.vcf", "tim_part_3.vcf"]);
        assert!(docs.iter().all(|d| d.chat_id == 99));
        assert!(h.transport.texts_to(99).is_empty());
        assert_eq!(h.runtime.state(), &SessionState::Idle);
        assert_eq!(h.session_dirs(), 0);
    }

    #[tokio::test]
    async fn test_oversized_attachment_is_not_downloaded() {
        let mut h = Harness::new();
        h.event(Event::Begin(Feature::Rename)).await;
        let before = h.runtime.state().clone();

        h.attach(FileRef {
            file_id: "big".into(),
            file_name: "big.vcf".into(),
            size: Some(2 * LIMIT),
        })
        .await;
        assert!(h.transport.downloads().is_empty());
        assert_eq!(h.runtime.state(), &before);
        assert_eq!(h.transport.last_text(), Some(prompts::file_too_large(LIMIT)));

        // Size unknown up front, checked after download
        h.transport.add_file("quiet", vec![b'x'; usize::try_from(LIMIT).unwrap() + 1]);
        h.attach(FileRef {
            file_id: "quiet".into(),
            file_name: "quiet.vcf".into(),
            size: None,
        })
        .await;
        assert_eq!(h.transport.downloads(), ["quiet"]);
        assert_eq!(h.runtime.state(), &before);
    }

    #[tokio::test]
    async fn test_unexpected_attachment_skips_download() {
        let mut h = Harness::new();
        h.upload("nomor.txt", b"0812").await;
        assert!(h.transport.downloads().is_empty());
        assert_eq!(h.transport.last_text().as_deref(), Some(prompts::IDLE_HINT));

        h.event(Event::Begin(Feature::Extract)).await;
        h.upload("nomor.txt", b"0812").await;
        assert!(h.transport.downloads().is_empty());
        assert!(h.transport.documents().is_empty());
    }

    #[tokio::test]
    async fn test_download_failure_keeps_state() {
        let mut h = Harness::new();
        h.event(Event::Begin(Feature::Rename)).await;
        let before = h.runtime.state().clone();
        h.attach(FileRef {
            file_id: "missing".into(),
            file_name: "a.vcf".into(),
            size: Some(10),
        })
        .await;
        assert_eq!(h.runtime.state(), &before);
        assert_eq!(
            h.transport.last_text().as_deref(),
            Some(prompts::DOWNLOAD_FAILED)
        );
    }

    #[tokio::test]
    async fn test_rename_dialogue() {
        let mut h = Harness::new();
        h.event(Event::Begin(Feature::Rename)).await;
        h.upload(
            "grup.vcf",
            b"BEGIN:VCARD\nVERSION:3.0\nFN:Alice\nTEL:+1\nEND:VCARD\nBEGIN:VCARD\nVERSION:3.0\nFN:Carol\nTEL:+2\nEND:VCARD\n",
        )
        .await;
        h.say("ya").await;
        h.say("baru").await;
        h.say("Alice").await;
        h.say("Bob").await;

        let docs = h.transport.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "baru.vcf");
        let text = String::from_utf8(docs[0].bytes.clone()).unwrap();
        assert!(text.contains("FN:Bob\n"));
        assert!(text.contains("FN:Carol\n"));
        assert_eq!(h.runtime.state(), &SessionState::Idle);
    }

    fn inbound(user_id: i64, kind: InboundKind) -> Inbound {
        Inbound {
            user_id,
            chat_id: user_id,
            kind,
        }
    }

    fn manager(work: &TempDir) -> (RuntimeManager<MockTransport>, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let manager = RuntimeManager::new(Arc::clone(&transport), WorkDir::new(work.path()), LIMIT);
        (manager, transport)
    }

    #[tokio::test]
    async fn test_start_and_unknown_commands_send_menu() {
        let work = tempfile::tempdir().unwrap();
        let (manager, transport) = manager(&work);

        manager
            .dispatch(inbound(1, InboundKind::Command(Command::Start)))
            .await;
        manager
            .dispatch(inbound(1, InboundKind::Command(Command::Unknown("x".into()))))
            .await;
        assert_eq!(transport.texts_to(1), [prompts::menu(), prompts::menu()]);
        assert_eq!(manager.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_users_have_independent_sessions() {
        let work = tempfile::tempdir().unwrap();
        let (manager, transport) = manager(&work);

        manager
            .dispatch(inbound(1, InboundKind::Command(Command::Feature(Feature::Extract))))
            .await;
        manager
            .dispatch(inbound(2, InboundKind::Command(Command::Feature(Feature::CustomNumber))))
            .await;
        manager
            .dispatch(inbound(1, InboundKind::Command(Command::Cancel)))
            .await;
        manager
            .dispatch(inbound(2, InboundKind::Text("Tim".into())))
            .await;
        // user 1 is idle again and retires, user 2 is mid-dialogue
        wait_for_sessions(&manager, 1).await;
        manager.shutdown().await;

        let first = transport.texts_to(1);
        assert_eq!(first.last().map(String::as_str), Some(prompts::CANCELLED));
        let second = transport.texts_to(2);
        assert_eq!(second.len(), 2);
        assert!(second[1].contains("Tim"));
    }

    async fn wait_for_sessions(manager: &RuntimeManager<MockTransport>, expected: usize) {
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while manager.active_sessions().await != expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("expected {expected} active sessions"));
    }

    #[tokio::test]
    async fn test_finished_sessions_are_reaped() {
        let work = tempfile::tempdir().unwrap();
        let (manager, transport) = manager(&work);

        for user in 1..=5 {
            manager
                .dispatch(inbound(user, InboundKind::Command(Command::Feature(Feature::Split))))
                .await;
            manager
                .dispatch(inbound(user, InboundKind::Command(Command::Cancel)))
                .await;
        }
        wait_for_sessions(&manager, 0).await;
        for user in 1..=5 {
            assert_eq!(
                transport.texts_to(user).last().map(String::as_str),
                Some(prompts::CANCELLED)
            );
        }

        // a retired user gets a fresh runtime on the next message
        manager
            .dispatch(inbound(1, InboundKind::Command(Command::Feature(Feature::Split))))
            .await;
        manager.dispatch(inbound(1, InboundKind::Text("Tim".into()))).await;
        wait_for_sessions(&manager, 1).await;
        manager.shutdown().await;
        assert!(transport.texts_to(1).last().unwrap().contains("Tim"));
    }

    #[tokio::test]
    async fn test_shutdown_removes_session_dirs() {
        let work = tempfile::tempdir().unwrap();
        let (manager, transport) = manager(&work);
        transport.add_file("f1", "0811\n0812\n0813\n0814\n0815\n");

        manager
            .dispatch(inbound(USER, InboundKind::Command(Command::Feature(Feature::Extract))))
            .await;
        manager.dispatch(inbound(USER, InboundKind::Text("2".into()))).await;
        manager
            .dispatch(inbound(
                USER,
                InboundKind::Document(FileRef {
                    file_id: "f1".into(),
                    file_name: "nomor.txt".into(),
                    size: None,
                }),
            ))
            .await;
        manager.shutdown().await;

        let docs = transport.documents();
        let names: Vec<&str> = docs.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, ["extracted_nomor.txt", "remaining_nomor.txt"]);
        assert_eq!(docs[0].bytes, b"+0811\n+0812\n");
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
        assert_eq!(manager.active_sessions().await, 0);
    }
}
