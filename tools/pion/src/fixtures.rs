//! In-memory ELF32 fixtures for pipeline and encoder tests.
//!
//! [`ElfBuilder`] lays files out the way the Quark linker does: the
//! 52-byte header, the program-header table (executables only), segment
//! and section payloads, then `.shstrtab` and the section-header table at
//! the end of the file.

use quark_elf::header::{ELF32_EHDR_SIZE, ELF32_PHDR_SIZE, ELF32_SHDR_SIZE};

/// One pending section-header record.
struct PendingSection {
    sh_name: u32,
    sh_type: u32,
    sh_addr: u32,
    sh_offset: u32,
    sh_size: u32,
}

/// Incrementally builds a small ELF32 file.
pub struct ElfBuilder {
    buf: Vec<u8>,
    next_phdr: usize,
    sections: Vec<PendingSection>,
    shstrtab: Vec<u8>,
}

impl ElfBuilder {
    /// An executable with room for `phnum` program headers directly after
    /// the file header.
    pub fn executable(phnum: usize) -> Self {
        let mut this = Self::bare(2);
        let phnum16 = u16::try_from(phnum).expect("fixture too large");
        this.buf[28..32].copy_from_slice(&(ELF32_EHDR_SIZE as u32).to_le_bytes());
        this.buf[42..44].copy_from_slice(&(ELF32_PHDR_SIZE as u16).to_le_bytes());
        this.buf[44..46].copy_from_slice(&phnum16.to_le_bytes());
        this.buf
            .resize(ELF32_EHDR_SIZE + phnum * ELF32_PHDR_SIZE, 0);
        this
    }

    /// A relocatable object: no entry point, no program headers.
    pub fn relocatable() -> Self {
        Self::bare(1)
    }

    /// A 52-byte header of the given `e_type` with common fields set.
    fn bare(e_type: u16) -> Self {
        let mut buf = vec![0u8; ELF32_EHDR_SIZE];
        buf[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        buf[4] = 1; // ELFCLASS32
        buf[5] = 1; // ELFDATA2LSB
        buf[6] = 1;
        buf[16..18].copy_from_slice(&e_type.to_le_bytes());
        buf[18..20].copy_from_slice(&3u16.to_le_bytes()); // EM_386
        buf[20..24].copy_from_slice(&1u32.to_le_bytes());
        buf[40..42].copy_from_slice(&(ELF32_EHDR_SIZE as u16).to_le_bytes());
        buf[46..48].copy_from_slice(&(ELF32_SHDR_SIZE as u16).to_le_bytes());

        Self {
            buf,
            next_phdr: 0,
            sections: vec![PendingSection {
                sh_name: 0,
                sh_type: 0,
                sh_addr: 0,
                sh_offset: 0,
                sh_size: 0,
            }],
            shstrtab: vec![0],
        }
    }

    /// Set the entry point.
    pub fn entry(&mut self, entry: u32) -> &mut Self {
        self.buf[24..28].copy_from_slice(&entry.to_le_bytes());
        self
    }

    /// Current end-of-file offset, where appended bytes will land.
    pub fn pos(&self) -> u32 {
        u32::try_from(self.buf.len()).expect("fixture too large")
    }

    /// Append raw bytes to the file body, returning their file offset.
    pub fn append(&mut self, data: &[u8]) -> u32 {
        let pos = self.pos();
        self.buf.extend_from_slice(data);
        pos
    }

    /// Fill the next program-header slot with a readable `PT_LOAD` entry
    /// (`paddr == vaddr`).
    pub fn load_segment(
        &mut self,
        offset: u32,
        vaddr: u32,
        filesz: u32,
        memsz: u32,
        align: u32,
    ) -> &mut Self {
        self.raw_segment(1, 4 | 1, offset, vaddr, vaddr, filesz, memsz, align)
    }

    /// Fill the next program-header slot with a fully explicit entry.
    #[allow(clippy::too_many_arguments)]
    pub fn raw_segment(
        &mut self,
        p_type: u32,
        p_flags: u32,
        p_offset: u32,
        p_vaddr: u32,
        p_paddr: u32,
        p_filesz: u32,
        p_memsz: u32,
        p_align: u32,
    ) -> &mut Self {
        let start = ELF32_EHDR_SIZE + self.next_phdr * ELF32_PHDR_SIZE;
        let b = &mut self.buf[start..start + ELF32_PHDR_SIZE];
        b[0..4].copy_from_slice(&p_type.to_le_bytes());
        b[4..8].copy_from_slice(&p_offset.to_le_bytes());
        b[8..12].copy_from_slice(&p_vaddr.to_le_bytes());
        b[12..16].copy_from_slice(&p_paddr.to_le_bytes());
        b[16..20].copy_from_slice(&p_filesz.to_le_bytes());
        b[20..24].copy_from_slice(&p_memsz.to_le_bytes());
        b[24..28].copy_from_slice(&p_flags.to_le_bytes());
        b[28..32].copy_from_slice(&p_align.to_le_bytes());
        self.next_phdr += 1;
        self
    }

    /// Add a section whose payload is appended at the current end of file.
    pub fn section(&mut self, name: &str, sh_type: u32, addr: u32, data: &[u8]) -> &mut Self {
        let offset = self.append(data);
        let size = u32::try_from(data.len()).expect("fixture too large");
        self.section_at(name, sh_type, addr, offset, size)
    }

    /// Add a section header with an explicit file offset and size (for
    /// `SHT_NOBITS` sections and deliberate layout violations).
    pub fn section_at(
        &mut self,
        name: &str,
        sh_type: u32,
        addr: u32,
        offset: u32,
        size: u32,
    ) -> &mut Self {
        let sh_name = self.intern(name);
        self.sections.push(PendingSection {
            sh_name,
            sh_type,
            sh_addr: addr,
            sh_offset: offset,
            sh_size: size,
        });
        self
    }

    /// Append `.shstrtab` and the section-header table, patch the header
    /// counts, and return the finished file.
    pub fn finish(mut self) -> Vec<u8> {
        let shstrtab_name = self.intern(".shstrtab");
        let shstrtab = std::mem::take(&mut self.shstrtab);
        let shstrtab_off = self.append(&shstrtab);
        self.sections.push(PendingSection {
            sh_name: shstrtab_name,
            sh_type: 3, // SHT_STRTAB
            sh_addr: 0,
            sh_offset: shstrtab_off,
            sh_size: u32::try_from(shstrtab.len()).expect("fixture too large"),
        });

        let shoff = self.pos();
        let shnum = u16::try_from(self.sections.len()).expect("fixture too large");
        let shstrndx = shnum - 1;
        for s in &self.sections {
            let mut b = [0u8; ELF32_SHDR_SIZE];
            b[0..4].copy_from_slice(&s.sh_name.to_le_bytes());
            b[4..8].copy_from_slice(&s.sh_type.to_le_bytes());
            b[12..16].copy_from_slice(&s.sh_addr.to_le_bytes());
            b[16..20].copy_from_slice(&s.sh_offset.to_le_bytes());
            b[20..24].copy_from_slice(&s.sh_size.to_le_bytes());
            self.buf.extend_from_slice(&b);
        }

        self.buf[32..36].copy_from_slice(&shoff.to_le_bytes());
        self.buf[48..50].copy_from_slice(&shnum.to_le_bytes());
        self.buf[50..52].copy_from_slice(&shstrndx.to_le_bytes());
        self.buf
    }

    /// Intern a name in `.shstrtab`, returning its offset.
    fn intern(&mut self, name: &str) -> u32 {
        let off = u32::try_from(self.shstrtab.len()).expect("fixture too large");
        self.shstrtab.extend_from_slice(name.as_bytes());
        self.shstrtab.push(0);
        off
    }
}
