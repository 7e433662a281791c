use std::collections::HashMap;
use std::sync::Mutex;

use crate::adapters::document_store::RecordStore;
use crate::adapters::object_store::BlobStore;
use crate::adapters::StoreError;
use crate::runtime::contract::StoredMessageRecord;

pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, StoredMessageRecord>>,
    writes: Mutex<usize>,
}

impl MemoryRecordStore {
    pub fn empty() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            writes: Mutex::new(0),
        }
    }

    pub fn with_records(records: &[StoredMessageRecord]) -> Self {
        let store = Self::empty();
        for record in records {
            store
                .records
                .lock()
                .expect("poisoned mutex")
                .insert(record.key.clone(), record.clone());
        }
        store
    }

    pub fn get(&self, key: &str) -> Option<StoredMessageRecord> {
        self.records.lock().expect("poisoned mutex").get(key).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().expect("poisoned mutex").len()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().expect("poisoned mutex")
    }
}

impl RecordStore for MemoryRecordStore {
    fn put_record(&self, record: &StoredMessageRecord) -> Result<(), StoreError> {
        *self.writes.lock().expect("poisoned mutex") += 1;
        self.records
            .lock()
            .expect("poisoned mutex")
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    fn get_record(&self, key: &str) -> Result<Option<StoredMessageRecord>, StoreError> {
        Ok(self.get(key))
    }
}

pub struct UnavailableRecordStore;

impl RecordStore for UnavailableRecordStore {
    fn put_record(&self, _record: &StoredMessageRecord) -> Result<(), StoreError> {
        Err(unavailable("dynamodb put_item"))
    }

    fn get_record(&self, _key: &str) -> Result<Option<StoredMessageRecord>, StoreError> {
        Err(unavailable("dynamodb get_item"))
    }
}

pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    reads: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn empty() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_objects<B: AsRef<[u8]>>(objects: &[(&str, B)]) -> Self {
        let store = Self::empty();
        for (key, body) in objects {
            let body: &[u8] = body.as_ref();
            store
                .objects
                .lock()
                .expect("poisoned mutex")
                .insert(key.to_string(), body.to_vec());
        }
        store
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().expect("poisoned mutex").clone()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read_object(&self, key: &str, max_bytes: u64) -> Result<Option<Vec<u8>>, StoreError> {
        self.reads
            .lock()
            .expect("poisoned mutex")
            .push(key.to_string());
        match self.objects.lock().expect("poisoned mutex").get(key) {
            Some(body) if body.len() as u64 > max_bytes => {
                Err(StoreError::TooLarge { limit: max_bytes })
            }
            Some(body) => Ok(Some(body.clone())),
            None => Ok(None),
        }
    }
}

pub struct FailingBlobStore;

impl BlobStore for FailingBlobStore {
    fn read_object(&self, _key: &str, _max_bytes: u64) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Failed {
            operation: "s3 get_object",
            message: "access denied".to_string(),
        })
    }
}

fn unavailable(operation: &'static str) -> StoreError {
    StoreError::Unavailable {
        operation,
        message: "dispatch failure".to_string(),
    }
}
