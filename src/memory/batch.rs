//! Scatter requests and the batches they are submitted in

use super::flags::ReadFlags;
use crate::core::types::{Address, ProviderError, ProviderResult, PAGE_SIZE};
use std::collections::HashSet;

/// Outcome of one scatter request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Not submitted yet
    Pending,
    /// The provider filled the buffer
    Success,
    /// The page could not be read
    Failure,
}

impl ReadOutcome {
    /// Whether the request has finished
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReadOutcome::Pending)
    }
}

/// One page-aligned read and the buffer it fills
#[derive(Debug)]
pub struct ScatterRequest {
    address: Address,
    buffer: Vec<u8>,
    outcome: ReadOutcome,
}

impl ScatterRequest {
    /// Creates a request for `size` bytes at `address`
    ///
    /// The address must be page aligned and the size a non-zero multiple of
    /// the page size.
    pub fn new(address: Address, size: usize) -> ProviderResult<Self> {
        if !address.is_page_aligned() {
            return Err(ProviderError::invalid_request(format!(
                "address {} is not page aligned",
                address
            )));
        }

        if size == 0 || size as u64 % PAGE_SIZE != 0 {
            return Err(ProviderError::invalid_request(format!(
                "size 0x{:X} at {} is not a non-zero multiple of the page size",
                size, address
            )));
        }

        if u32::try_from(size).is_err() {
            return Err(ProviderError::invalid_request(format!(
                "size 0x{:X} at {} exceeds the provider limit",
                size, address
            )));
        }

        if address.checked_add(size as u64).is_none() {
            return Err(ProviderError::invalid_request(format!(
                "request at {} wraps the address space",
                address
            )));
        }

        Ok(ScatterRequest {
            address,
            buffer: vec![0; size],
            outcome: ReadOutcome::Pending,
        })
    }

    /// Creates a single-page request
    pub fn page(address: Address) -> ProviderResult<Self> {
        Self::new(address, PAGE_SIZE as usize)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn outcome(&self) -> ReadOutcome {
        self.outcome
    }

    /// Buffer contents; only meaningful after a successful read
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub(crate) fn set_outcome(&mut self, outcome: ReadOutcome) {
        self.outcome = outcome;
    }

    pub(crate) fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

/// Requests submitted together in one provider call
///
/// Order is kept for correlating results; the provider gives no guarantee
/// about the order pages are read in.
#[derive(Debug, Default)]
pub struct ScatterBatch {
    requests: Vec<ScatterRequest>,
    addresses: HashSet<Address>,
    flags: ReadFlags,
}

impl ScatterBatch {
    /// Creates an empty batch
    pub fn new(flags: ReadFlags) -> Self {
        ScatterBatch {
            requests: Vec::new(),
            addresses: HashSet::new(),
            flags,
        }
    }

    /// Creates a batch of single-page requests
    pub fn from_pages<I>(pages: I, flags: ReadFlags) -> ProviderResult<Self>
    where
        I: IntoIterator<Item = Address>,
    {
        let mut batch = Self::new(flags);
        for page in pages {
            batch.add_page(page)?;
        }
        Ok(batch)
    }

    /// Creates page requests covering `len` bytes from `base`
    ///
    /// The range is widened to page boundaries on both ends.
    pub fn for_region(base: Address, len: u64, flags: ReadFlags) -> ProviderResult<Self> {
        let mut batch = Self::new(flags);
        if len == 0 {
            return Ok(batch);
        }

        let start = base.align_down(PAGE_SIZE);
        let end = base
            .checked_add(len)
            .and_then(|end| end.align_up(PAGE_SIZE))
            .ok_or_else(|| {
                ProviderError::invalid_request(format!(
                    "region of 0x{:X} bytes at {} wraps the address space",
                    len, base
                ))
            })?;

        let mut page = start;
        while page < end {
            batch.add_page(page)?;
            page = Address::new(page.as_u64() + PAGE_SIZE);
        }
        Ok(batch)
    }

    /// Adds a request for `size` bytes at `address`
    pub fn add(&mut self, address: Address, size: usize) -> ProviderResult<()> {
        if self.addresses.contains(&address) {
            return Err(ProviderError::invalid_request(format!(
                "address {} requested twice in one batch",
                address
            )));
        }
        let request = ScatterRequest::new(address, size)?;
        self.addresses.insert(address);
        self.requests.push(request);
        Ok(())
    }

    /// Adds a single-page request
    pub fn add_page(&mut self, address: Address) -> ProviderResult<()> {
        self.add(address, PAGE_SIZE as usize)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn flags(&self) -> ReadFlags {
        self.flags
    }

    pub fn requests(&self) -> &[ScatterRequest] {
        &self.requests
    }

    /// Requested addresses, in submission order
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.requests.iter().map(ScatterRequest::address)
    }

    pub(crate) fn into_requests(self) -> Vec<ScatterRequest> {
        self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request() {
        let request = ScatterRequest::page(Address::new(0x7FF6_0000_0000)).unwrap();
        assert_eq!(request.size(), 0x1000);
        assert_eq!(request.outcome(), ReadOutcome::Pending);
        assert!(!request.outcome().is_terminal());
        assert!(request.buffer().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_request_validation() {
        assert!(ScatterRequest::page(Address::new(0x1001)).is_err());
        assert!(ScatterRequest::new(Address::new(0x1000), 0).is_err());
        assert!(ScatterRequest::new(Address::new(0x1000), 0x800).is_err());
        assert!(ScatterRequest::new(Address::new(0x1000), 0x3000).is_ok());
        assert!(ScatterRequest::page(Address::new(u64::MAX & !0xFFF)).is_err());
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut batch = ScatterBatch::new(ReadFlags::NOCACHE);
        batch.add_page(Address::new(0x1000)).unwrap();
        let result = batch.add_page(Address::new(0x1000));
        assert!(matches!(result, Err(ProviderError::InvalidRequest(_))));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_for_region_widens_to_pages() {
        let batch =
            ScatterBatch::for_region(Address::new(0x1800), 0x1000, ReadFlags::NONE).unwrap();
        let pages: Vec<Address> = batch.addresses().collect();
        assert_eq!(pages, vec![Address::new(0x1000), Address::new(0x2000)]);

        let exact =
            ScatterBatch::for_region(Address::new(0x4000), 0x3000, ReadFlags::NONE).unwrap();
        assert_eq!(exact.len(), 3);

        let empty = ScatterBatch::for_region(Address::new(0x4000), 0, ReadFlags::NONE).unwrap();
        assert!(empty.is_empty());

        assert!(ScatterBatch::for_region(Address::new(u64::MAX - 10), 0x100, ReadFlags::NONE)
            .is_err());
    }

    #[test]
    fn test_from_pages_keeps_order_and_flags() {
        let pages = [Address::new(0x3000), Address::new(0x1000), Address::new(0x2000)];
        let batch = ScatterBatch::from_pages(pages, ReadFlags::NOCACHE).unwrap();
        assert_eq!(batch.addresses().collect::<Vec<_>>(), pages.to_vec());
        assert_eq!(batch.flags(), ReadFlags::NOCACHE);
    }
}
