// OLE2 (compound file binary) reader.
//
// Embedded MathType objects are OLE compound files; the equation lives in a
// stream named "Equation Native". This reader covers the read-only path
// needed to get at such streams: header validation, FAT/DIFAT/MiniFAT
// loading, directory traversal, and stream extraction by name.

use super::consts::*;
use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// On-disk directory entry (128 bytes).
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes, including the null terminator
    name_len: U16<LE>,
    /// 1 = storage, 2 = stream, 5 = root
    entry_type: u8,
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// A parsed directory entry (stream or storage).
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub sid: u32,
    pub name: String,
    pub entry_type: u8,
    pub sid_left: u32,
    pub sid_right: u32,
    pub sid_child: u32,
    pub start_sector: u32,
    pub size: u64,
    pub is_minifat: bool,
}

/// An open OLE2 compound file.
#[derive(Debug)]
pub struct OleFile<R: Read + Seek> {
    reader: R,
    sector_size: usize,
    mini_sector_size: usize,
    mini_stream_cutoff: u32,
    /// FAT: maps a sector to the next sector in its chain
    fat: Vec<u32>,
    /// MiniFAT: same, for streams below the cutoff size
    minifat: Vec<u32>,
    first_dir_sector: u32,
    root: Option<DirectoryEntry>,
    dir_entries: Vec<Option<DirectoryEntry>>,
    /// Mini stream contents, loaded on first use
    ministream: Option<Vec<u8>>,
}

impl<R: Read + Seek> OleFile<R> {
    /// Open and parse a compound file from a reader.
    pub fn open(mut reader: R) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if file_size < MINIMAL_OLEFILE_SIZE as u64 {
            return Err(Error::NotOleFile);
        }

        let mut header = [0u8; 512];
        reader.read_exact(&mut header)?;
        if &header[0..8] != MAGIC {
            return Err(Error::NotOleFile);
        }

        let dll_version = read_u16(&header, 0x1A);
        let byte_order = read_u16(&header, 0x1C);
        let sector_shift = read_u16(&header, 0x1E);
        let mini_sector_shift = read_u16(&header, 0x20);
        let first_dir_sector = read_u32(&header, 0x30);
        let mini_stream_cutoff = read_u32(&header, 0x38);
        let first_minifat_sector = read_u32(&header, 0x3C);
        let num_minifat_sectors = read_u32(&header, 0x40);
        let first_difat_sector = read_u32(&header, 0x44);
        let num_difat_sectors = read_u32(&header, 0x48);

        if byte_order != 0xFFFE {
            return Err(Error::InvalidFormat("invalid OLE byte order".to_string()));
        }

        let sector_size = 1usize << sector_shift;
        let mini_sector_size = 1usize << mini_sector_shift;
        if (dll_version == 3 && sector_size != 512) || (dll_version == 4 && sector_size != 4096) {
            return Err(Error::InvalidFormat("sector size mismatch".to_string()));
        }

        let mut ole = OleFile {
            reader,
            sector_size,
            mini_sector_size,
            mini_stream_cutoff,
            fat: Vec::new(),
            minifat: Vec::new(),
            first_dir_sector,
            root: None,
            dir_entries: Vec::new(),
            ministream: None,
        };

        ole.load_fat(&header, first_difat_sector, num_difat_sectors)?;
        ole.load_directory()?;
        if num_minifat_sectors > 0 {
            ole.load_minifat(first_minifat_sector)?;
        }

        Ok(ole)
    }

    /// Load the FAT. The first 109 FAT sector indexes live in the header;
    /// the rest chain through DIFAT sectors.
    fn load_fat(
        &mut self,
        header: &[u8; 512],
        first_difat_sector: u32,
        num_difat_sectors: u32,
    ) -> Result<()> {
        let mut fat_sectors = Vec::new();
        for i in 0..109 {
            let sector = read_u32(header, 0x4C + i * 4);
            if sector == FREESECT || sector == ENDOFCHAIN {
                break;
            }
            fat_sectors.push(sector);
        }

        if num_difat_sectors > 0 {
            let mut difat_sector = first_difat_sector;
            let entries_per_sector = (self.sector_size / 4) - 1; // last u32 chains

            for _ in 0..num_difat_sectors {
                let sector_data = self.read_sector(difat_sector)?;
                for i in 0..entries_per_sector {
                    let sector = read_u32(&sector_data, i * 4);
                    if sector == FREESECT || sector == ENDOFCHAIN {
                        break;
                    }
                    fat_sectors.push(sector);
                }

                difat_sector = read_u32(&sector_data, entries_per_sector * 4);
                if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                    break;
                }
            }
        }

        let entries_per_sector = self.sector_size / 4;
        self.fat.reserve(fat_sectors.len() * entries_per_sector);
        for &sector_id in &fat_sectors {
            let sector_data = self.read_sector(sector_id)?;
            for i in 0..entries_per_sector {
                self.fat.push(read_u32(&sector_data, i * 4));
            }
        }

        Ok(())
    }

    fn load_minifat(&mut self, first_minifat_sector: u32) -> Result<()> {
        let minifat_data = self.read_stream_from_fat(first_minifat_sector)?;
        self.minifat.reserve(minifat_data.len() / 4);
        for chunk in minifat_data.chunks_exact(4) {
            self.minifat
                .push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        Ok(())
    }

    fn load_directory(&mut self) -> Result<()> {
        let dir_data = self.read_stream_from_fat(self.first_dir_sector)?;
        let num_entries = dir_data.len() / DIRENTRY_SIZE;
        self.dir_entries = vec![None; num_entries];

        if num_entries > 0 {
            let root = self.parse_directory_entry(&dir_data[0..DIRENTRY_SIZE], 0)?;
            let root_child = root.sid_child;
            self.root = Some(root);
            self.load_directory_subtree(root_child, &dir_data)?;
        }

        Ok(())
    }

    fn parse_directory_entry(&self, data: &[u8], sid: u32) -> Result<DirectoryEntry> {
        let raw = RawDirectoryEntry::read_from_bytes(data)
            .map_err(|_| Error::InvalidFormat("bad directory entry".to_string()))?;

        let name_len = raw.name_len.get() as usize;
        let name = decode_utf16le(&raw.name[0..name_len.saturating_sub(2).min(64)]);

        // 512-byte-sector files only use the low half of the size field.
        let size = if self.sector_size == 512 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };
        let is_minifat =
            size < u64::from(self.mini_stream_cutoff) && raw.entry_type == STGTY_STREAM;

        Ok(DirectoryEntry {
            sid,
            name,
            entry_type: raw.entry_type,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
            start_sector: raw.start_sector.get(),
            size,
            is_minifat,
        })
    }

    /// Parse the red-black tree rooted at `sid` into `dir_entries`.
    fn load_directory_subtree(&mut self, sid: u32, dir_data: &[u8]) -> Result<()> {
        if sid == NOSTREAM {
            return Ok(());
        }
        let index = sid as usize;
        if index >= dir_data.len() / DIRENTRY_SIZE {
            return Err(Error::CorruptedFile("directory entry out of range".to_string()));
        }

        if self.dir_entries[index].is_none() {
            let offset = index * DIRENTRY_SIZE;
            let entry =
                self.parse_directory_entry(&dir_data[offset..offset + DIRENTRY_SIZE], sid)?;
            self.dir_entries[index] = Some(entry);
        }

        let entry = self.dir_entries[index].as_ref().expect("just inserted");
        let (left, right, child) = (entry.sid_left, entry.sid_right, entry.sid_child);

        self.load_directory_subtree(left, dir_data)?;
        self.load_directory_subtree(right, dir_data)?;
        self.load_directory_subtree(child, dir_data)?;
        Ok(())
    }

    /// Sector `n` starts at byte `(n + 1) * sector_size` (the header is
    /// sector -1).
    fn read_sector(&mut self, sector_id: u32) -> Result<Vec<u8>> {
        let position = (u64::from(sector_id) + 1) * self.sector_size as u64;
        self.reader.seek(SeekFrom::Start(position))?;

        let mut buffer = vec![0u8; self.sector_size];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn read_stream_from_fat(&mut self, start_sector: u32) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut sector = start_sector;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.fat.len() {
                return Err(Error::CorruptedFile("sector index outside FAT".to_string()));
            }
            let sector_data = self.read_sector(sector)?;
            data.extend_from_slice(&sector_data);
            sector = self.fat[sector as usize];
        }

        Ok(data)
    }

    fn read_stream_from_minifat(&mut self, start_sector: u32, size: u64) -> Result<Vec<u8>> {
        if self.ministream.is_none() {
            let root = self
                .root
                .as_ref()
                .ok_or_else(|| Error::CorruptedFile("no root entry".to_string()))?;
            let start = root.start_sector;
            let data = self.read_stream_from_fat(start)?;
            self.ministream = Some(data);
        }

        let ministream = self.ministream.as_ref().expect("loaded above");
        let mut data = Vec::new();
        let mut sector = start_sector;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.minifat.len() {
                return Err(Error::CorruptedFile("sector index outside MiniFAT".to_string()));
            }
            let position = sector as usize * self.mini_sector_size;
            if position + self.mini_sector_size > ministream.len() {
                return Err(Error::CorruptedFile("mini sector out of bounds".to_string()));
            }
            data.extend_from_slice(&ministream[position..position + self.mini_sector_size]);
            sector = self.minifat[sector as usize];
        }

        data.truncate(size as usize);
        Ok(data)
    }

    /// All stream paths in the file, as storage/stream name vectors.
    pub fn list_streams(&self) -> Vec<Vec<String>> {
        let mut streams = Vec::new();
        if let Some(ref root) = self.root {
            if root.sid_child != NOSTREAM {
                self.collect_streams(root.sid_child, &Vec::new(), &mut streams);
            }
        }
        streams
    }

    fn collect_streams(&self, sid: u32, path: &Vec<String>, streams: &mut Vec<Vec<String>>) {
        if sid == NOSTREAM || sid as usize >= self.dir_entries.len() {
            return;
        }
        let Some(ref entry) = self.dir_entries[sid as usize] else {
            return;
        };

        self.collect_streams(entry.sid_left, path, streams);

        let mut entry_path = path.clone();
        entry_path.push(entry.name.clone());
        if entry.entry_type == STGTY_STREAM {
            streams.push(entry_path);
        } else if entry.entry_type == STGTY_STORAGE && entry.sid_child != NOSTREAM {
            self.collect_streams(entry.sid_child, &entry_path, streams);
        }

        self.collect_streams(entry.sid_right, path, streams);
    }

    /// Whether a stream or storage exists at `path`.
    pub fn exists(&self, path: &[&str]) -> bool {
        self.find_entry(path).is_ok()
    }

    /// Read a stream's full contents by path.
    pub fn open_stream(&mut self, path: &[&str]) -> Result<Vec<u8>> {
        let entry = self.find_entry(path)?;
        if entry.entry_type != STGTY_STREAM {
            return Err(Error::InvalidFormat("not a stream".to_string()));
        }

        if entry.is_minifat {
            self.read_stream_from_minifat(entry.start_sector, entry.size)
        } else {
            let mut data = self.read_stream_from_fat(entry.start_sector)?;
            data.truncate(entry.size as usize);
            Ok(data)
        }
    }

    fn find_entry(&self, path: &[&str]) -> Result<DirectoryEntry> {
        let not_found = || Error::StreamNotFound(path.join("/"));

        let root = self.root.as_ref().ok_or_else(not_found)?;
        if path.is_empty() {
            return Ok(root.clone());
        }

        let mut current_sid = root.sid_child;
        for (i, &name) in path.iter().enumerate() {
            let entry = self
                .find_child_by_name(current_sid, name)
                .ok_or_else(not_found)?;
            if i == path.len() - 1 {
                return Ok(entry);
            }
            current_sid = entry.sid_child;
        }

        Err(not_found())
    }

    /// Case-insensitive name search within one directory level.
    fn find_child_by_name(&self, sid: u32, name: &str) -> Option<DirectoryEntry> {
        if sid == NOSTREAM || sid as usize >= self.dir_entries.len() {
            return None;
        }
        let entry = self.dir_entries[sid as usize].as_ref()?;

        if entry.name.eq_ignore_ascii_case(name) {
            return Some(entry.clone());
        }
        self.find_child_by_name(entry.sid_left, name)
            .or_else(|| self.find_child_by_name(entry.sid_right, name))
    }
}

/// Whether the data starts like an OLE compound file.
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MINIMAL_OLEFILE_SIZE && &data[0..8] == MAGIC
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    U16::<LE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .unwrap_or(0)
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    U32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .unwrap_or(0)
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}
