// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw FreeType bindings resolved from a dynamically loaded artifact.
//!
//! Only the handful of entry points and struct prefixes the comparison needs are
//! mirrored here. Everything outside this module is safe code.

#![allow(
    unsafe_code,
    reason = "FFI boundary to a C library loaded at run time."
)]

use core::ffi::{c_char, c_int, c_long, c_short, c_uchar, c_uint, c_ushort, c_void};
use core::fmt;
use core::ptr;
use std::ffi::CString;
use std::path::Path;

use log::warn;

use crate::bitmap::RawBitmap;

type FtError = c_int;
type FtLibrary = *mut c_void;
type FtFace = *mut FaceRec;

/// `FT_LOAD_DEFAULT`.
const LOAD_DEFAULT: i32 = 0;
/// `FT_RENDER_MODE_NORMAL`: 8-bit anti-aliased coverage.
const RENDER_MODE_NORMAL: c_uint = 0;

type InitFreeTypeFn = unsafe extern "C" fn(*mut FtLibrary) -> FtError;
type NewFaceFn = unsafe extern "C" fn(FtLibrary, *const c_char, c_long, *mut FtFace) -> FtError;
type SetCharSizeFn = unsafe extern "C" fn(FtFace, c_long, c_long, c_uint, c_uint) -> FtError;
type LoadGlyphFn = unsafe extern "C" fn(FtFace, c_uint, i32) -> FtError;
type RenderGlyphFn = unsafe extern "C" fn(*mut GlyphSlotRec, c_uint) -> FtError;
type DoneFaceFn = unsafe extern "C" fn(FtFace) -> FtError;
type DoneFreeTypeFn = unsafe extern "C" fn(FtLibrary) -> FtError;

#[repr(C)]
#[allow(dead_code, reason = "Mirrors the C layout; never read.")]
struct Generic {
    data: *mut c_void,
    finalizer: *mut c_void,
}

#[repr(C)]
#[allow(dead_code, reason = "Mirrors the C layout; never read.")]
struct BBox {
    x_min: c_long,
    y_min: c_long,
    x_max: c_long,
    y_max: c_long,
}

/// Leading fields of `FT_FaceRec`, up to and including `glyph`.
#[repr(C)]
#[allow(dead_code, reason = "Mirrors the C layout; only some fields are read.")]
struct FaceRec {
    num_faces: c_long,
    face_index: c_long,
    face_flags: c_long,
    style_flags: c_long,
    num_glyphs: c_long,
    family_name: *mut c_char,
    style_name: *mut c_char,
    num_fixed_sizes: c_int,
    available_sizes: *mut c_void,
    num_charmaps: c_int,
    charmaps: *mut c_void,
    generic: Generic,
    bbox: BBox,
    units_per_em: c_ushort,
    ascender: c_short,
    descender: c_short,
    height: c_short,
    max_advance_width: c_short,
    max_advance_height: c_short,
    underline_position: c_short,
    underline_thickness: c_short,
    glyph: *mut GlyphSlotRec,
}

#[repr(C)]
#[allow(dead_code, reason = "Mirrors the C layout; only some fields are read.")]
struct BitmapRec {
    rows: c_uint,
    width: c_uint,
    pitch: c_int,
    buffer: *mut c_uchar,
    num_grays: c_ushort,
    pixel_mode: c_uchar,
    palette_mode: c_uchar,
    palette: *mut c_void,
}

/// Leading fields of `FT_GlyphSlotRec`, up to and including `bitmap_top`.
#[repr(C)]
#[allow(dead_code, reason = "Mirrors the C layout; only some fields are read.")]
struct GlyphSlotRec {
    library: FtLibrary,
    face: FtFace,
    next: *mut GlyphSlotRec,
    glyph_index: c_uint,
    generic: Generic,
    metrics: [c_long; 8],
    linear_hori_advance: c_long,
    linear_vert_advance: c_long,
    advance: [c_long; 2],
    format: c_uint,
    bitmap: BitmapRec,
    bitmap_left: c_int,
    bitmap_top: c_int,
}

/// A non-zero `FT_Error`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Code(pub(crate) i32);

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FreeType error 0x{:02x}", self.0)
    }
}

impl Code {
    /// `FT_Err_Invalid_Argument`, for arguments that do not fit FreeType's types.
    pub(crate) const INVALID_ARGUMENT: Self = Self(0x06);
}

fn check(code: FtError) -> Result<(), Code> {
    if code == 0 { Ok(()) } else { Err(Code(code)) }
}

/// `points` as a 26.6 fixed-point `FT_F26Dot6`.
fn char_size_26_6(points: u32) -> Result<c_long, Code> {
    c_long::try_from(points)
        .ok()
        .and_then(|points| points.checked_mul(64))
        .ok_or(Code::INVALID_ARGUMENT)
}

/// Why [`Library::load`] failed.
#[derive(Debug)]
pub(crate) enum LoadFailure {
    Open(libloading::Error),
    MissingSymbol(&'static str),
    Init(Code),
}

/// The seven entry points, resolved up front.
#[derive(Copy, Clone)]
struct Api {
    init_freetype: InitFreeTypeFn,
    new_face: NewFaceFn,
    set_char_size: SetCharSizeFn,
    load_glyph: LoadGlyphFn,
    render_glyph: RenderGlyphFn,
    done_face: DoneFaceFn,
    done_freetype: DoneFreeTypeFn,
}

impl Api {
    fn resolve(artifact: &libloading::Library) -> Result<Self, &'static str> {
        /// Copy a function pointer out of the artifact.
        ///
        /// # Safety
        ///
        /// `T` must be the exact signature of the exported symbol `name`.
        unsafe fn symbol<T: Copy>(
            artifact: &libloading::Library,
            name: &'static str,
        ) -> Result<T, &'static str> {
            // SAFETY: upheld by the caller.
            unsafe { artifact.get::<T>(name.as_bytes()) }
                .map(|sym| *sym)
                .map_err(|_| name)
        }

        // SAFETY: signatures match the FreeType 2 public API.
        unsafe {
            Ok(Self {
                init_freetype: symbol(artifact, "FT_Init_FreeType")?,
                new_face: symbol(artifact, "FT_New_Face")?,
                set_char_size: symbol(artifact, "FT_Set_Char_Size")?,
                load_glyph: symbol(artifact, "FT_Load_Glyph")?,
                render_glyph: symbol(artifact, "FT_Render_Glyph")?,
                done_face: symbol(artifact, "FT_Done_Face")?,
                done_freetype: symbol(artifact, "FT_Done_FreeType")?,
            })
        }
    }
}

#[cfg(target_os = "linux")]
fn open_artifact(path: &Path) -> Result<libloading::Library, libloading::Error> {
    use libloading::os::unix::{Library, RTLD_LAZY, RTLD_LOCAL};
    /// Prefer the artifact's own symbols over ones already in the process, so
    /// two FreeType builds can coexist.
    const RTLD_DEEPBIND: c_int = 0x0008;
    // SAFETY: loading runs the artifact's initialisers; the artifact is trusted
    // input chosen by the user.
    let flags = RTLD_LAZY | RTLD_LOCAL | RTLD_DEEPBIND;
    unsafe { Library::open(Some(path), flags) }.map(Into::into)
}

#[cfg(all(unix, not(target_os = "linux")))]
fn open_artifact(path: &Path) -> Result<libloading::Library, libloading::Error> {
    use libloading::os::unix::{Library, RTLD_LAZY, RTLD_LOCAL};
    // SAFETY: see the Linux variant.
    unsafe { Library::open(Some(path), RTLD_LAZY | RTLD_LOCAL) }.map(Into::into)
}

#[cfg(not(unix))]
fn open_artifact(path: &Path) -> Result<libloading::Library, libloading::Error> {
    // SAFETY: see the Linux variant.
    unsafe { libloading::Library::new(path) }
}

fn c_path(path: &Path) -> Option<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_str()?.as_bytes().to_vec();
    CString::new(bytes).ok()
}

/// An initialised `FT_Library` together with the artifact it came from.
pub(crate) struct Library {
    handle: FtLibrary,
    api: Api,
    // Dropped after `Drop::drop` has shut the library down.
    _artifact: libloading::Library,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Library {
    /// Load the artifact at `path`, resolve every entry point, and initialise.
    pub(crate) fn load(path: &Path) -> Result<Self, LoadFailure> {
        let artifact = open_artifact(path).map_err(LoadFailure::Open)?;
        let api = Api::resolve(&artifact).map_err(LoadFailure::MissingSymbol)?;
        let mut handle: FtLibrary = ptr::null_mut();
        // SAFETY: `handle` is a valid out-pointer.
        check(unsafe { (api.init_freetype)(&mut handle) }).map_err(LoadFailure::Init)?;
        Ok(Self {
            handle,
            api,
            _artifact: artifact,
        })
    }

    /// Open face `face_index` of the font at `path`.
    ///
    /// Returns `None` for the code if the path cannot be expressed as a C string.
    pub(crate) fn open_face(
        &self,
        path: &Path,
        face_index: u32,
    ) -> Result<Face<'_>, Option<Code>> {
        let path = c_path(path).ok_or(None)?;
        let face_index = c_long::try_from(face_index).map_err(|_| Some(Code::INVALID_ARGUMENT))?;
        let mut face: FtFace = ptr::null_mut();
        // SAFETY: `self.handle` is live, `path` is NUL-terminated and `face` is a
        // valid out-pointer.
        let code = unsafe {
            (self.api.new_face)(
                self.handle,
                path.as_ptr(),
                face_index,
                &mut face,
            )
        };
        check(code).map_err(Some)?;
        Ok(Face {
            library: self,
            handle: face,
        })
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        // SAFETY: every `Face` borrows `self`, so none is alive here.
        if let Err(code) = check(unsafe { (self.api.done_freetype)(self.handle) }) {
            warn!("FT_Done_FreeType: {code}");
        }
    }
}

/// An open `FT_Face`. Closed on drop.
pub(crate) struct Face<'lib> {
    library: &'lib Library,
    handle: FtFace,
}

impl fmt::Debug for Face<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Face")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Face<'_> {
    /// Set the nominal size: `points` at `dpi` on both axes.
    pub(crate) fn set_char_size(&mut self, points: u32, dpi: u32) -> Result<(), Code> {
        let width = char_size_26_6(points)?;
        // SAFETY: `self.handle` is a live face. Zero height and vertical
        // resolution make FreeType reuse the horizontal values.
        check(unsafe { (self.library.api.set_char_size)(self.handle, width, 0, dpi, 0) })
    }

    pub(crate) fn num_glyphs(&self) -> u32 {
        // SAFETY: `self.handle` points to a live `FT_FaceRec`.
        let count = unsafe { (*self.handle).num_glyphs };
        u32::try_from(count).unwrap_or(0)
    }

    /// Load and render `glyph_id`, then hand the slot's bitmap to `read`.
    ///
    /// The view is only valid until the next load on this face, so it is not
    /// allowed to escape the closure.
    pub(crate) fn render<R>(
        &mut self,
        glyph_id: u32,
        read: impl FnOnce(RawBitmap<'_>) -> R,
    ) -> Result<R, (Stage, Code)> {
        let api = &self.library.api;
        // SAFETY: `self.handle` is a live face.
        check(unsafe { (api.load_glyph)(self.handle, glyph_id, LOAD_DEFAULT) })
            .map_err(|code| (Stage::Load, code))?;
        // SAFETY: a successful load leaves a valid slot in `glyph`.
        let slot = unsafe { (*self.handle).glyph };
        // SAFETY: `slot` belongs to this face.
        check(unsafe { (api.render_glyph)(slot, RENDER_MODE_NORMAL) })
            .map_err(|code| (Stage::Render, code))?;

        // SAFETY: after a successful render the slot's bitmap describes
        // `rows * |pitch|` bytes at `buffer`, owned by the slot.
        let bitmap = unsafe { &(*slot).bitmap };
        let len = bitmap.rows as usize * bitmap.pitch.unsigned_abs() as usize;
        let buffer = if bitmap.buffer.is_null() || len == 0 {
            &[][..]
        } else {
            // SAFETY: see above; the slice does not outlive this call.
            unsafe { core::slice::from_raw_parts(bitmap.buffer, len) }
        };
        Ok(read(RawBitmap {
            rows: bitmap.rows,
            width: bitmap.width,
            pitch: bitmap.pitch,
            pixel_mode: bitmap.pixel_mode,
            buffer,
        }))
    }
}

impl Drop for Face<'_> {
    fn drop(&mut self) {
        // SAFETY: `self.handle` was returned by `FT_New_Face` and is closed once.
        if let Err(code) = check(unsafe { (self.library.api.done_face)(self.handle) }) {
            warn!("FT_Done_Face: {code}");
        }
    }
}

/// Which FreeType call a render failure came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    Load,
    Render,
}
