//! DDS container header for extracted images
//!
//! Streamed image payloads are raw block-compressed mip data. Extraction
//! prepends a constant 148-byte DDS header (DX10 extension, BC7) with three
//! fields patched per image:
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x0C   | Pixel width |
//! | 0x10   | Pixel height |
//! | 0x14   | Payload size (decompressed) |
//!
//! Everything else is [`DDS_TEMPLATE`] byte for byte.

/// Size of the DDS header including magic and DX10 extension
pub const DDS_HEADER_SIZE: usize = 148;

/// Offset of the patched width field
pub const WIDTH_OFFSET: usize = 12;
/// Offset of the patched height field
pub const HEIGHT_OFFSET: usize = 16;
/// Offset of the patched payload size field
pub const SIZE_OFFSET: usize = 20;

const DDSD_FLAGS: u32 = 0x000A_1007; // caps | height | width | pixelformat | mipmapcount | linearsize
const DDPF_FOURCC: u32 = 0x4;
const DDSCAPS_TEXTURE: u32 = 0x1000;
const DXGI_FORMAT_BC7_UNORM: u32 = 98;
const D3D10_RESOURCE_DIMENSION_TEXTURE2D: u32 = 3;

/// Constant DDS header the per-image fields are patched into
pub const DDS_TEMPLATE: [u8; DDS_HEADER_SIZE] = build_template();

const fn put_u32(buf: &mut [u8; DDS_HEADER_SIZE], offset: usize, value: u32) {
    let bytes = value.to_le_bytes();
    buf[offset] = bytes[0];
    buf[offset + 1] = bytes[1];
    buf[offset + 2] = bytes[2];
    buf[offset + 3] = bytes[3];
}

const fn build_template() -> [u8; DDS_HEADER_SIZE] {
    let mut h = [0u8; DDS_HEADER_SIZE];
    put_u32(&mut h, 0, u32::from_le_bytes(*b"DDS "));
    put_u32(&mut h, 4, 124); // dwSize
    put_u32(&mut h, 8, DDSD_FLAGS);
    put_u32(&mut h, 28, 1); // dwMipMapCount
    // DDS_PIXELFORMAT
    put_u32(&mut h, 76, 32);
    put_u32(&mut h, 80, DDPF_FOURCC);
    put_u32(&mut h, 84, u32::from_le_bytes(*b"DX10"));
    put_u32(&mut h, 108, DDSCAPS_TEXTURE);
    // DDS_HEADER_DXT10
    put_u32(&mut h, 128, DXGI_FORMAT_BC7_UNORM);
    put_u32(&mut h, 132, D3D10_RESOURCE_DIMENSION_TEXTURE2D);
    put_u32(&mut h, 140, 1); // arraySize
    h
}

/// Build the DDS header for one image
pub fn image_header(width: u32, height: u32, decompressed_size: u32) -> [u8; DDS_HEADER_SIZE] {
    let mut header = DDS_TEMPLATE;
    put_u32(&mut header, WIDTH_OFFSET, width);
    put_u32(&mut header, HEIGHT_OFFSET, height);
    put_u32(&mut header, SIZE_OFFSET, decompressed_size);
    header
}
